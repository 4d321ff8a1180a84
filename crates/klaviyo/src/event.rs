use klaviyo_core::fields::parse_key_value;
use klaviyo_core::{FieldBag, OperationKind, OutputRecord, ResourceKind};
use serde_json::{json, Map, Value};

use crate::dispatch::{dispatch_single, print_records};
use crate::prelude::{println, *};

/// Event commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List events
    #[clap(name = "list")]
    List(ListOptions),

    /// Create (track) an event
    #[clap(name = "create")]
    Create(CreateOptions),
}

/// Options for listing events
#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Create a new event
#[derive(Debug, clap::Args, Clone)]
pub struct CreateOptions {
    /// Metric name (e.g., "Placed Order")
    #[arg(long = "metric")]
    pub metric_name: String,

    /// Profile identifier as KEY=VALUE (e.g., email=ada@example.com), repeatable
    #[arg(long, value_parser = parse_key_value)]
    pub profile: Vec<(String, String)>,

    /// Event property as KEY=VALUE, repeatable
    #[arg(long = "property", value_parser = parse_key_value)]
    pub properties: Vec<(String, String)>,

    /// Service that generated the metric
    #[arg(long)]
    pub metric_service: Option<String>,

    /// When the event happened (ISO 8601)
    #[arg(long)]
    pub time: Option<String>,

    /// Numeric value associated with the event (e.g., order total)
    #[arg(long)]
    pub value: Option<f64>,

    /// Unique ID used to deduplicate the event
    #[arg(long)]
    pub unique_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn pair_list(pairs: &[(String, String)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect(),
    )
}

/// Field bag for `event create`
///
/// Optional extras are wrapped as `{name: {name: value}}`, the shape the
/// request builder hoists onto the event attributes.
pub fn create_fields(options: &CreateOptions) -> FieldBag {
    let mut extras = Map::new();
    let mut wrap = |name: &str, value: Value| {
        let mut wrapper = Map::new();
        wrapper.insert(name.to_string(), value);
        extras.insert(name.to_string(), Value::Object(wrapper));
    };

    if let Some(service) = &options.metric_service {
        wrap("metricService", json!(service));
    }
    if let Some(time) = &options.time {
        wrap("time", json!(time));
    }
    if let Some(value) = options.value {
        wrap("value", json!(value));
    }
    if let Some(unique_id) = &options.unique_id {
        wrap("uniqueId", json!(unique_id));
    }

    FieldBag::new()
        .with("metricName", options.metric_name.as_str())
        .with("profile", json!({ "profile": pair_list(&options.profile) }))
        .with(
            "attributes",
            json!({ "attribute": pair_list(&options.properties) }),
        )
        .with("properties", Value::Object(extras))
}

pub async fn list_events_data(global: &crate::Global) -> Result<OutputRecord> {
    dispatch_single(
        ResourceKind::Event,
        OperationKind::GetAll,
        FieldBag::new(),
        global,
    )
    .await
}

pub async fn create_event_data(
    options: &CreateOptions,
    global: &crate::Global,
) -> Result<OutputRecord> {
    if options.profile.is_empty() {
        log::warn!("Creating an event without profile identifiers; Klaviyo will reject it");
    }

    dispatch_single(
        ResourceKind::Event,
        OperationKind::Create,
        create_fields(options),
        global,
    )
    .await
}

/// Run event commands
pub async fn run(cmd: Commands, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running event command...");
    }

    match cmd {
        Commands::List(options) => {
            let record = list_events_data(&global).await?;
            print_records(&[record], options.json, false)
        }
        Commands::Create(options) => {
            let record = create_event_data(&options, &global).await?;
            print_records(&[record], options.json, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klaviyo_core::build_request;

    fn options() -> CreateOptions {
        CreateOptions {
            metric_name: "Placed Order".to_string(),
            profile: vec![("email".to_string(), "ada@example.com".to_string())],
            properties: vec![
                ("sku".to_string(), "A-1".to_string()),
                ("sku".to_string(), "B-2".to_string()),
            ],
            metric_service: None,
            time: Some("2025-01-15T10:00:00Z".to_string()),
            value: Some(42.5),
            unique_id: None,
            json: false,
        }
    }

    #[test]
    fn test_create_fields_build_event_body() {
        let fields = create_fields(&options());
        let request = build_request(ResourceKind::Event, OperationKind::Create, &fields).unwrap();

        assert_eq!(
            request.body,
            json!({
                "data": {
                    "type": "event",
                    "attributes": {
                        "profile": {"email": "ada@example.com"},
                        "metric": {"name": "Placed Order"},
                        "properties": {"sku": "B-2"},
                        "time": "2025-01-15T10:00:00Z",
                        "value": 42.5
                    }
                }
            })
        );
    }

    #[test]
    fn test_create_fields_without_extras() {
        let mut options = options();
        options.time = None;
        options.value = None;

        let fields = create_fields(&options);
        assert_eq!(fields.get("properties"), Some(&json!({})));
    }
}
