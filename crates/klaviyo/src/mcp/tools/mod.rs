mod klaviyo;

use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Wrap a serializable payload as a text tool result
pub fn text_result<T: Serialize>(payload: &T) -> Result<serde_json::Value, JsonRpcError> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;

    let result = CallToolResult {
        content: vec![Content::Text { text }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "klaviyo".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "klaviyo_dispatch".to_string(),
            description: "Send Klaviyo API requests selected by resource and operation. Supported pairs: flow/get_all, template/get_all, template/get_one (templateId, optional fields list), template/render (templateId, variables list of {name, value}), event/get_all, event/create (metricName, profile list of {key, value}, attributes list of {key, value}, optional properties of {<name>: {<name>: value}} wrappers such as metricService, time, value or uniqueId, hoisted onto the event attributes). One request is sent per item, in order, and the raw JSON:API response of each is returned. Requires the KLAVIYO_API_KEY environment variable.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "resource": {
                        "type": "string",
                        "description": "Resource to act on",
                        "enum": ["flow", "template", "event"]
                    },
                    "operation": {
                        "type": "string",
                        "description": "Operation to perform on the resource",
                        "enum": ["get_all", "get_one", "render", "create"]
                    },
                    "fields": {
                        "type": "object",
                        "description": "Field values for a single request (e.g., {\"templateId\": \"XyZ123\", \"fields\": [\"name\"]})"
                    },
                    "items": {
                        "type": "array",
                        "description": "Field objects, one request per entry. Takes precedence over 'fields'.",
                        "items": { "type": "object" }
                    },
                    "continue_on_fail": {
                        "type": "boolean",
                        "description": "Record failing items as {\"error\": ...} instead of aborting (default: false)"
                    }
                },
                "required": ["resource", "operation"]
            }),
        },
        Tool {
            name: "klaviyo_operations".to_string(),
            description: "List the resource and operation pairs accepted by klaviyo_dispatch, with the HTTP method and path each one uses.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?;

    match params.name.as_str() {
        "klaviyo_dispatch" => klaviyo::handle_klaviyo_dispatch(params.arguments, global).await,
        "klaviyo_operations" => klaviyo::handle_klaviyo_operations(),
        _ => Err(JsonRpcError::invalid_params(format!(
            "Unknown tool: {}",
            params.name
        ))),
    }
}
