mod cli;
mod stdio;
mod tools;

pub use cli::App;

use crate::prelude::*;
use serde::{Deserialize, Serialize};

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        cli::Commands::Stdio => stdio::run_stdio(global).await,
    }
}

/// Handle one JSON-RPC message
///
/// Notifications (no `id`) get no response.
pub async fn handle_request(request_str: &str, global: &crate::Global) -> Option<JsonRpcResponse> {
    let value: serde_json::Value = match serde_json::from_str(request_str) {
        Ok(value) => value,
        Err(e) => return Some(error_response(-32700, format!("Parse error: {e}"))),
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(req) => req,
        Err(e) => return Some(error_response(-32600, format!("Invalid Request: {e}"))),
    };

    if request.id.is_none() {
        log::debug!("Ignoring notification {}", request.method);
        return None;
    }

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, global).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    Some(match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    })
}

fn error_response(code: i32, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id: None,
        result: None,
        error: Some(JsonRpcError {
            code,
            message,
            data: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klaviyo_core::{DEFAULT_BASE_URL, DEFAULT_REVISION};

    fn global() -> crate::Global {
        crate::Global {
            api_key: None,
            revision: DEFAULT_REVISION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            verbose: false,
        }
    }

    fn to_json(response: Option<JsonRpcResponse>) -> serde_json::Value {
        serde_json::to_value(response.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = to_json(
            handle_request(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#, &global()).await,
        );
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "klaviyo");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = to_json(
            handle_request(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, &global()).await,
        );
        let names: Vec<&str> = response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["klaviyo_dispatch", "klaviyo_operations"]);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let response = handle_request(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            &global(),
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_parse_error_and_unknown_method() {
        let response = to_json(handle_request("{not json", &global()).await);
        assert_eq!(response["error"]["code"], -32700);

        let response = to_json(
            handle_request(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#, &global())
                .await,
        );
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_well_formed_json_without_method_is_invalid_request() {
        let response = to_json(handle_request(r#"{"jsonrpc":"2.0","id":4}"#, &global()).await);
        assert_eq!(response["error"]["code"], -32600);

        let response = to_json(handle_request("[1, 2]", &global()).await);
        assert_eq!(response["error"]["code"], -32600);
    }
}
