//! HTTP transport for built requests

use klaviyo_core::response::{api_error_message, parse_body};
use klaviyo_core::{auth_headers, Method, RequestDescriptor};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::config::KlaviyoConfig;
use crate::prelude::*;

/// Create an HTTP client that sends the Klaviyo auth headers on every call
pub fn create_klaviyo_client(config: &KlaviyoConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in auth_headers(&config.credentials) {
        let mut value = HeaderValue::from_str(&value)
            .map_err(|e| eyre!("Invalid header value for {}: {}", name, e))?;
        if name == "authorization" {
            value.set_sensitive(true);
        }
        headers.insert(HeaderName::from_static(name), value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("klaviyo/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Execute one request and return the raw JSON body
///
/// Non-2xx statuses and bodies that are not JSON are errors; nothing is
/// retried.
pub async fn send_request(
    client: &reqwest::Client,
    base_url: &str,
    request: &RequestDescriptor,
) -> std::result::Result<Value, Error> {
    let url = request.url(base_url);
    log::debug!("{} {}", request.method, url);

    let builder = match request.method {
        Method::Get => client.get(&url),
        Method::Post => client.post(&url),
        Method::Put => client.put(&url),
        Method::Delete => client.delete(&url),
    };

    let builder = if request.has_body() {
        let body = serde_json::to_string(&request.body)
            .map_err(|e| Error::Transport(format!("Failed to serialize request body: {e}")))?;
        builder.body(body)
    } else {
        builder
    };

    let response = builder
        .send()
        .await
        .map_err(|e| Error::Transport(format!("Failed to send {} {}: {}", request.method, url, e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("Failed to read response body: {e}")))?;

    log::debug!("{} {} -> {}", request.method, url, status);

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }

    parse_body(&body).map_err(|e| Error::MalformedResponse(e.to_string()))
}
