use klaviyo_core::request::route;
use klaviyo_core::resource::supported_operations;
use klaviyo_core::{FieldBag, OperationKind, ResourceKind};
use serde::Deserialize;

use super::{text_result, JsonRpcError};

#[derive(Debug, Deserialize)]
struct DispatchArgs {
    resource: String,
    operation: String,
    fields: Option<serde_json::Value>,
    items: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    continue_on_fail: bool,
}

/// Resolve the items of a tool call: `items` wins over `fields`
fn collect_items(
    fields: Option<serde_json::Value>,
    items: Option<Vec<serde_json::Value>>,
) -> Result<Vec<FieldBag>, JsonRpcError> {
    let values = match (items, fields) {
        (Some(items), _) => items,
        (None, Some(fields)) => vec![fields],
        (None, None) => vec![serde_json::Value::Null],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            FieldBag::try_from(value)
                .map_err(|e| JsonRpcError::invalid_params(format!("Item {index}: {e}")))
        })
        .collect()
}

pub async fn handle_klaviyo_dispatch(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: DispatchArgs = serde_json::from_value(arguments.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))?;

    let resource: ResourceKind = args
        .resource
        .parse()
        .map_err(|e| JsonRpcError::invalid_params(format!("{e}")))?;
    let operation: OperationKind = args
        .operation
        .parse()
        .map_err(|e| JsonRpcError::invalid_params(format!("{e}")))?;
    let items = collect_items(args.fields, args.items)?;

    log::info!(
        "Calling klaviyo_dispatch: {} {} for {} item(s)",
        resource,
        operation,
        items.len()
    );

    let records =
        crate::dispatch::dispatch_data(resource, operation, items, args.continue_on_fail, global)
            .await
            .map_err(|e| JsonRpcError::internal(format!("Tool execution error: {e}")))?;

    text_result(&records)
}

pub fn handle_klaviyo_operations() -> Result<serde_json::Value, JsonRpcError> {
    let operations: Vec<serde_json::Value> = ResourceKind::ALL
        .into_iter()
        .flat_map(|resource| {
            supported_operations(resource)
                .iter()
                .filter_map(move |operation| {
                    route(resource, *operation).map(|(method, path)| {
                        serde_json::json!({
                            "resource": resource,
                            "operation": operation,
                            "method": method,
                            "path": path,
                        })
                    })
                })
        })
        .collect();

    text_result(&operations)
}
