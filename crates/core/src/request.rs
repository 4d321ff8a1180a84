//! Request building
//!
//! Maps a (resource, operation, field bag) triple to a [`RequestDescriptor`].
//! Every supported pair has its own arm in [`build_request`]; anything else is
//! rejected before a path is ever produced.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::DispatchError;
use crate::fields::{fold_present_pairs, fold_required_pairs, FieldBag};
use crate::resource::{OperationKind, ResourceKind};

/// HTTP method of an outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready for the transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the API base URL, may carry a query string
    pub path: String,
    /// JSON body; an empty object for reads
    pub body: Value,
}

impl RequestDescriptor {
    pub(crate) fn read(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: Value::Object(Map::new()),
        }
    }

    fn write(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body,
        }
    }

    /// Whether the body carries anything worth sending
    pub fn has_body(&self) -> bool {
        match &self.body {
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            _ => true,
        }
    }

    /// Join the path onto a base URL
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

/// Build the request for one input item
pub fn build_request(
    resource: ResourceKind,
    operation: OperationKind,
    fields: &FieldBag,
) -> Result<RequestDescriptor, DispatchError> {
    match (resource, operation) {
        (ResourceKind::Flow, OperationKind::GetAll) => Ok(RequestDescriptor::read("/flows")),
        (ResourceKind::Template, OperationKind::GetAll) => {
            Ok(RequestDescriptor::read("/templates"))
        }
        (ResourceKind::Template, OperationKind::GetOne) => {
            let id = fields.required_str("templateId")?;
            let sparse = fields.string_list("fields")?;
            Ok(RequestDescriptor::read(template_path(id, &sparse)))
        }
        (ResourceKind::Template, OperationKind::Render) => {
            let id = fields.required_str("templateId")?;
            let variables = fields.pair_entries("variables", "variable", "name")?;
            let context = fold_required_pairs("variables", variables)?;
            Ok(RequestDescriptor::write(
                "/template-render",
                render_body(id, context),
            ))
        }
        (ResourceKind::Event, OperationKind::GetAll) => Ok(RequestDescriptor::read("/events")),
        (ResourceKind::Event, OperationKind::Create) => {
            let metric_name = fields.required_str("metricName")?;
            let profile = fold_required_pairs(
                "profile",
                fields.pair_entries("profile", "profile", "key")?,
            )?;
            let properties =
                fold_present_pairs(fields.pair_entries("attributes", "attribute", "key")?);
            let extras = fields.extra_properties("properties")?;

            let base = event_attributes(profile, metric_name, properties);
            let attributes = hoist_extra_properties(base, extras);

            Ok(RequestDescriptor::write("/events", event_body(attributes)))
        }
        (resource, operation) => Err(DispatchError::UnknownOperation {
            resource,
            operation,
        }),
    }
}

/// Method and path template of a supported pair, for display
pub fn route(resource: ResourceKind, operation: OperationKind) -> Option<(Method, &'static str)> {
    match (resource, operation) {
        (ResourceKind::Flow, OperationKind::GetAll) => Some((Method::Get, "/flows")),
        (ResourceKind::Template, OperationKind::GetAll) => Some((Method::Get, "/templates")),
        (ResourceKind::Template, OperationKind::GetOne) => Some((
            Method::Get,
            "/templates/{id}/?fields[template]={fields}",
        )),
        (ResourceKind::Template, OperationKind::Render) => {
            Some((Method::Post, "/template-render"))
        }
        (ResourceKind::Event, OperationKind::GetAll) => Some((Method::Get, "/events")),
        (ResourceKind::Event, OperationKind::Create) => Some((Method::Post, "/events")),
        _ => None,
    }
}

/// Path for a single template, with an optional sparse fieldset
///
/// `fields[template]` is kept literal; only the id is percent-encoded.
pub fn template_path(id: &str, fields: &[String]) -> String {
    let query = if fields.is_empty() {
        String::new()
    } else {
        format!("?fields[template]={}", fields.join(","))
    };

    format!("/templates/{}/{}", urlencoding::encode(id), query)
}

/// `POST /template-render` body
pub fn render_body(id: &str, context: Map<String, Value>) -> Value {
    json!({
        "data": {
            "type": "template",
            "attributes": {
                "context": context,
                "id": id,
            }
        }
    })
}

/// Base attributes of a created event, before extra properties are applied
pub fn event_attributes(
    profile: Map<String, Value>,
    metric_name: &str,
    properties: Map<String, Value>,
) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("profile".to_string(), Value::Object(profile));
    attributes.insert("metric".to_string(), json!({ "name": metric_name }));
    attributes.insert("properties".to_string(), Value::Object(properties));
    attributes
}

/// Apply extra properties on top of already built attributes
///
/// Runs last, so an extra property overwrites any base attribute of the same
/// name.
pub fn hoist_extra_properties<I>(mut attributes: Map<String, Value>, extras: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    for (name, value) in extras {
        attributes.insert(name, value);
    }
    attributes
}

/// `POST /events` body
pub fn event_body(attributes: Map<String, Value>) -> Value {
    json!({
        "data": {
            "type": "event",
            "attributes": attributes,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(value: Value) -> FieldBag {
        FieldBag::try_from(value).unwrap()
    }

    fn unrelated_fields() -> FieldBag {
        bag(json!({
            "templateId": "T1",
            "metricName": "Placed Order",
            "fields": ["name"],
            "noise": {"deeply": ["nested"]},
        }))
    }

    #[test]
    fn test_flow_get_all() {
        let request =
            build_request(ResourceKind::Flow, OperationKind::GetAll, &unrelated_fields()).unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/flows");
        assert!(!request.has_body());
    }

    #[test]
    fn test_template_get_all_is_terminal() {
        let request = build_request(
            ResourceKind::Template,
            OperationKind::GetAll,
            &unrelated_fields(),
        )
        .unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/templates");
        assert_eq!(request.body, json!({}));
    }

    #[test]
    fn test_template_get_all_needs_no_template_id() {
        let request =
            build_request(ResourceKind::Template, OperationKind::GetAll, &FieldBag::new())
                .unwrap();
        assert_eq!(request.path, "/templates");
    }

    #[test]
    fn test_event_get_all() {
        let request =
            build_request(ResourceKind::Event, OperationKind::GetAll, &unrelated_fields())
                .unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/events");
        assert!(!request.has_body());
    }

    #[test]
    fn test_template_get_one_without_fields() {
        let fields = bag(json!({"templateId": "XyZ123", "fields": []}));
        let request =
            build_request(ResourceKind::Template, OperationKind::GetOne, &fields).unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/templates/XyZ123/");
        assert!(!request.has_body());
    }

    #[test]
    fn test_template_get_one_with_fields() {
        let fields = bag(json!({"templateId": "XyZ123", "fields": ["name", "id"]}));
        let request =
            build_request(ResourceKind::Template, OperationKind::GetOne, &fields).unwrap();
        assert_eq!(request.path, "/templates/XyZ123/?fields[template]=name,id");
    }

    #[test]
    fn test_template_get_one_encodes_id() {
        let fields = bag(json!({"templateId": "a b/c"}));
        let request =
            build_request(ResourceKind::Template, OperationKind::GetOne, &fields).unwrap();
        assert_eq!(request.path, "/templates/a%20b%2Fc/");
    }

    #[test]
    fn test_template_get_one_requires_id() {
        let result = build_request(
            ResourceKind::Template,
            OperationKind::GetOne,
            &bag(json!({"fields": ["name"]})),
        );
        assert_eq!(
            result.unwrap_err(),
            DispatchError::InvalidField {
                field: "templateId".to_string(),
                reason: "required".to_string(),
            }
        );
    }

    #[test]
    fn test_template_render_body() {
        let fields = bag(json!({
            "templateId": "T1",
            "variables": {"variable": [
                {"name": "first_name", "value": "Ada"},
                {"name": "plan", "value": "free"},
                {"name": "plan", "value": "pro"}
            ]}
        }));
        let request =
            build_request(ResourceKind::Template, OperationKind::Render, &fields).unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/template-render");
        assert_eq!(
            request.body,
            json!({
                "data": {
                    "type": "template",
                    "attributes": {
                        "context": {"first_name": "Ada", "plan": "pro"},
                        "id": "T1"
                    }
                }
            })
        );
    }

    #[test]
    fn test_template_render_without_variables() {
        let fields = bag(json!({"templateId": "T1"}));
        let request =
            build_request(ResourceKind::Template, OperationKind::Render, &fields).unwrap();
        assert_eq!(request.body["data"]["attributes"]["context"], json!({}));
        assert!(request.has_body());
    }

    #[test]
    fn test_template_render_requires_id() {
        let fields = bag(json!({"variables": []}));
        let result = build_request(ResourceKind::Template, OperationKind::Render, &fields);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidField { ref field, .. }) if field == "templateId"
        ));
    }

    #[test]
    fn test_event_create_body() {
        let fields = bag(json!({
            "metricName": "Placed Order",
            "profile": {"profile": [
                {"key": "email", "value": "old@example.com"},
                {"key": "email", "value": "ada@example.com"}
            ]},
            "attributes": {"attribute": [
                {"key": "sku", "value": "A-1"},
                null
            ]}
        }));
        let request =
            build_request(ResourceKind::Event, OperationKind::Create, &fields).unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/events");
        assert_eq!(
            request.body,
            json!({
                "data": {
                    "type": "event",
                    "attributes": {
                        "profile": {"email": "ada@example.com"},
                        "metric": {"name": "Placed Order"},
                        "properties": {"sku": "A-1"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_event_create_hoists_extra_properties() {
        let fields = bag(json!({
            "metricName": "X",
            "profile": [],
            "properties": {
                "value": {"value": 42},
                "time": {"time": "2025-01-15T10:00:00Z"}
            }
        }));
        let request =
            build_request(ResourceKind::Event, OperationKind::Create, &fields).unwrap();
        let attributes = &request.body["data"]["attributes"];

        assert_eq!(attributes["value"], json!(42));
        assert_eq!(attributes["time"], json!("2025-01-15T10:00:00Z"));
        assert_eq!(attributes["metric"], json!({"name": "X"}));
        assert!(attributes.get("metricService").is_none());
        assert!(attributes.get("uniqueId").is_none());
    }

    #[test]
    fn test_event_create_hoisted_metric_replaces_base_metric() {
        let fields = bag(json!({
            "metricName": "X",
            "profile": [],
            "properties": {"metric": {"metric": {"name": "Y"}}}
        }));
        let request =
            build_request(ResourceKind::Event, OperationKind::Create, &fields).unwrap();
        let attributes = &request.body["data"]["attributes"];

        assert_eq!(attributes["metric"], json!({"name": "Y"}));
        assert_eq!(attributes["profile"], json!({}));
        assert_eq!(attributes["properties"], json!({}));
    }

    #[test]
    fn test_event_create_requires_metric_name() {
        let fields = bag(json!({"profile": [{"key": "email", "value": "a@b.co"}]}));
        let result = build_request(ResourceKind::Event, OperationKind::Create, &fields);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidField { ref field, .. }) if field == "metricName"
        ));
    }

    #[test]
    fn test_event_create_rejects_null_profile_entry() {
        let fields = bag(json!({"metricName": "X", "profile": [null]}));
        let result = build_request(ResourceKind::Event, OperationKind::Create, &fields);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidField { ref field, .. }) if field == "profile"
        ));
    }

    #[test]
    fn test_hoist_overwrites_base_attributes() {
        let mut base = event_attributes(Map::new(), "X", Map::new());
        base.insert("value".to_string(), json!("stale"));

        let hoisted = hoist_extra_properties(base, vec![("value".to_string(), json!(42))]);

        assert_eq!(hoisted["value"], json!(42));
        assert_eq!(hoisted["metric"], json!({"name": "X"}));
    }

    #[test]
    fn test_unknown_operation_pairs() {
        let unsupported = [
            (ResourceKind::Flow, OperationKind::GetOne),
            (ResourceKind::Flow, OperationKind::Render),
            (ResourceKind::Flow, OperationKind::Create),
            (ResourceKind::Template, OperationKind::Create),
            (ResourceKind::Event, OperationKind::GetOne),
            (ResourceKind::Event, OperationKind::Render),
        ];

        for (resource, operation) in unsupported {
            let result = build_request(resource, operation, &unrelated_fields());
            assert_eq!(
                result.unwrap_err(),
                DispatchError::UnknownOperation {
                    resource,
                    operation
                }
            );
        }
    }

    #[test]
    fn test_every_supported_pair_builds() {
        let fields = bag(json!({"templateId": "T1", "metricName": "X"}));
        for resource in ResourceKind::ALL {
            for operation in crate::resource::supported_operations(resource) {
                assert!(build_request(resource, *operation, &fields).is_ok());
            }
        }
    }

    #[test]
    fn test_route_matches_builder() {
        let fields = bag(json!({"templateId": "T1", "metricName": "X"}));
        for resource in ResourceKind::ALL {
            for operation in OperationKind::ALL {
                let expected = route(resource, operation);
                match build_request(resource, operation, &fields) {
                    Ok(request) => {
                        let (method, template) = expected.unwrap();
                        assert_eq!(request.method, method);
                        let prefix = template.split('{').next().unwrap();
                        assert!(request.path.starts_with(prefix));
                    }
                    Err(_) => assert!(expected.is_none()),
                }
            }
        }
    }

    #[test]
    fn test_url_joins_base() {
        let request = RequestDescriptor::read("/flows");
        assert_eq!(
            request.url("https://a.klaviyo.com/api/"),
            "https://a.klaviyo.com/api/flows"
        );
        assert_eq!(
            request.url("https://a.klaviyo.com/api"),
            "https://a.klaviyo.com/api/flows"
        );
    }
}
