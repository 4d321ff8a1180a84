//! Response normalization
//!
//! Raw API bodies are passed through untouched; the JSON:API `data` envelope
//! is not unwrapped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The raw JSON response for one input item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRecord(pub Value);

impl OutputRecord {
    /// Parse a response body
    ///
    /// Whitespace-only bodies (Klaviyo answers event creation with
    /// `202 Accepted` and no content) become an empty object.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        parse_body(body).map(Self)
    }

    /// Record stored in place of a failed item when processing continues
    pub fn from_error(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("error".to_string(), Value::String(message.into()));
        Self(Value::Object(map))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// JSON:API resource objects carried in `data`, for display purposes
    pub fn resources(&self) -> Vec<&Value> {
        match self.0.get("data") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(item) if item.is_object() => vec![item],
            _ => Vec::new(),
        }
    }
}

/// Parse a raw response body, an empty body yields an empty object
pub fn parse_body(body: &str) -> Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(body)
}

/// Human readable message from a JSON:API error document
///
/// Joins the `detail` (or `title`) of every entry in `errors`. Falls back to
/// the raw body when it is not an error document.
pub fn api_error_message(body: &str) -> String {
    let Ok(document) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let messages: Vec<String> = document
        .get("errors")
        .and_then(|errors| errors.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|error| {
                    let text = error
                        .get("detail")
                        .or_else(|| error.get("title"))
                        .and_then(|t| t.as_str())?;
                    let pointer = error
                        .get("source")
                        .and_then(|s| s.get("pointer"))
                        .and_then(|p| p.as_str());
                    Some(match pointer {
                        Some(pointer) => format!("{pointer}: {text}"),
                        None => text.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        body.to_string()
    } else {
        messages.join("\n")
    }
}

/// Wrap raw responses as output records, one per input, in order
pub fn normalize_responses<I>(responses: I) -> impl Iterator<Item = OutputRecord>
where
    I: IntoIterator<Item = Value>,
{
    responses.into_iter().map(OutputRecord)
}
