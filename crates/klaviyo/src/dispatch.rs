//! Per-item dispatch loop
//!
//! Items are processed one at a time, in order. Each item gets its own
//! request descriptor and exactly one outbound call before the next item is
//! built.

use std::path::PathBuf;

use colored::Colorize;
use klaviyo_core::{
    build_request, normalize_responses, FieldBag, OperationKind, OutputRecord, ResourceKind,
};
use serde_json::Value;

use crate::client::{create_klaviyo_client, send_request};
use crate::config::KlaviyoConfig;
use crate::prelude::{eprintln, println, *};

/// Run one request per input item
#[derive(Debug, clap::Args, Clone)]
pub struct DispatchOptions {
    /// Resource: flow, template or event
    #[arg(long)]
    pub resource: String,

    /// Operation: get_all, get_one, render or create
    #[arg(long)]
    pub operation: String,

    /// JSON file holding an array of field objects, or a single object (use - for stdin)
    #[arg(long, conflicts_with = "fields")]
    pub input: Option<PathBuf>,

    /// Field object for a single item, as inline JSON
    #[arg(long)]
    pub fields: Option<String>,

    /// Record failing items as {"error": ...} and keep going
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Build and send the request for a single item
pub async fn dispatch_one(
    client: &reqwest::Client,
    config: &KlaviyoConfig,
    resource: ResourceKind,
    operation: OperationKind,
    fields: &FieldBag,
) -> std::result::Result<Value, Error> {
    let request = build_request(resource, operation, fields)?;
    send_request(client, &config.base_url, &request).await
}

/// Dispatch every item sequentially and normalize the responses
///
/// The output has one record per item, in input order. The first failure
/// aborts the run unless `continue_on_fail` is set, in which case the failing
/// item's slot holds an error record.
pub async fn dispatch_items(
    client: &reqwest::Client,
    config: &KlaviyoConfig,
    resource: ResourceKind,
    operation: OperationKind,
    items: &[FieldBag],
    continue_on_fail: bool,
) -> std::result::Result<Vec<OutputRecord>, Error> {
    let mut responses = Vec::with_capacity(items.len());

    for (index, fields) in items.iter().enumerate() {
        match dispatch_one(client, config, resource, operation, fields).await {
            Ok(body) => responses.push(body),
            Err(err) if continue_on_fail => {
                log::warn!("Item {index} failed: {err}");
                responses.push(OutputRecord::from_error(err.to_string()).into_value());
            }
            Err(err) => {
                return Err(Error::Item {
                    index,
                    source: Box::new(err),
                })
            }
        }
    }

    Ok(normalize_responses(responses).collect())
}

/// Resolve config, build a client and dispatch a batch of items
pub async fn dispatch_data(
    resource: ResourceKind,
    operation: OperationKind,
    items: Vec<FieldBag>,
    continue_on_fail: bool,
    global: &crate::Global,
) -> Result<Vec<OutputRecord>> {
    let config = KlaviyoConfig::from_global(global)?;
    let client = create_klaviyo_client(&config)?;

    if global.verbose {
        eprintln!(
            "Dispatching {} {} for {} item(s) against {}",
            resource,
            operation,
            items.len(),
            config.base_url
        );
    }

    let records =
        dispatch_items(&client, &config, resource, operation, &items, continue_on_fail).await?;

    Ok(records)
}

/// Dispatch a single item
pub async fn dispatch_single(
    resource: ResourceKind,
    operation: OperationKind,
    fields: FieldBag,
    global: &crate::Global,
) -> Result<OutputRecord> {
    dispatch_data(resource, operation, vec![fields], false, global)
        .await?
        .pop()
        .ok_or_eyre("No response was produced")
}

/// Parse items from a JSON document: an array of field objects or one object
pub fn parse_items(document: &str) -> Result<Vec<FieldBag>> {
    let value: Value =
        serde_json::from_str(document).map_err(|e| eyre!("Failed to parse input items: {}", e))?;

    let values = match value {
        Value::Array(values) => values,
        other => vec![other],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            FieldBag::try_from(value).map_err(|e| eyre!("Input item {}: {}", index, e))
        })
        .collect()
}

fn read_items(options: &DispatchOptions) -> Result<Vec<FieldBag>> {
    match (&options.input, &options.fields) {
        (Some(path), _) if path.as_os_str() == "-" => {
            let document = std::io::read_to_string(std::io::stdin())
                .context("Failed to read input items from stdin")?;
            parse_items(&document)
        }
        (Some(path), _) => {
            let document = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input items from {}", path.display()))?;
            parse_items(&document)
        }
        (None, Some(fields)) => parse_items(fields),
        (None, None) => Ok(vec![FieldBag::new()]),
    }
}

/// Print records as JSON or as a table of the resources they carry
///
/// `batch` keeps the JSON output an array whatever the item count. Single
/// resource commands print their one record as a bare object.
pub fn print_records(records: &[OutputRecord], json: bool, batch: bool) -> Result<()> {
    if json {
        println!("{}", records_json(records, batch)?);
        return Ok(());
    }

    for record in records {
        display_record(record)?;
    }

    Ok(())
}

fn records_json(records: &[OutputRecord], batch: bool) -> serde_json::Result<String> {
    match records {
        [single] if !batch => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    }
}

fn display_record(record: &OutputRecord) -> Result<()> {
    if let Some(error) = record.as_value().get("error").and_then(|e| e.as_str()) {
        std::println!("{} {}", "Error:".red().bold(), error);
        return Ok(());
    }

    let resources = record.resources();
    if resources.is_empty() {
        if record.as_value().as_object().is_some_and(|o| o.is_empty()) {
            std::println!("{}", "Accepted".green().bold());
        } else {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Type".bold().cyan(),
        "Name".bold().cyan()
    ]);

    for resource in resources {
        let id = resource.get("id").and_then(|v| v.as_str()).unwrap_or("-");
        let kind = resource.get("type").and_then(|v| v.as_str()).unwrap_or("-");
        let name = resource
            .get("attributes")
            .and_then(|a| a.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or("-");

        table.add_row(prettytable::row![
            id.bright_white().to_string(),
            kind.bright_blue().to_string(),
            name.green().to_string()
        ]);
    }

    table.printstd();

    if let Some(next) = record
        .as_value()
        .get("links")
        .and_then(|l| l.get("next"))
        .and_then(|n| n.as_str())
    {
        std::println!("\n{} {}", "Next page:".bright_black(), next.bright_black());
    }

    Ok(())
}

/// CLI handler for the dispatch command
pub async fn run(options: DispatchOptions, global: crate::Global) -> Result<()> {
    let resource: ResourceKind = options.resource.parse()?;
    let operation: OperationKind = options.operation.parse()?;
    let items = read_items(&options)?;

    let records =
        dispatch_data(resource, operation, items, options.continue_on_fail, &global).await?;

    print_records(&records, options.json, true)
}
