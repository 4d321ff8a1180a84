use klaviyo_core::fields::parse_key_value;
use klaviyo_core::{FieldBag, OperationKind, OutputRecord, ResourceKind};
use serde_json::json;

use crate::dispatch::{dispatch_single, print_records};
use crate::prelude::{println, *};

/// Template commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List templates
    #[clap(name = "list")]
    List(ListOptions),

    /// Get a single template
    #[clap(name = "get")]
    Get(GetOptions),

    /// Render a template with context variables
    #[clap(name = "render")]
    Render(RenderOptions),
}

/// Options for listing templates
#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for getting a template
#[derive(Debug, clap::Args, Clone)]
pub struct GetOptions {
    /// Template ID
    pub template_id: String,

    /// Sparse fieldset, comma separated (e.g., name,html)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for rendering a template
#[derive(Debug, clap::Args, Clone)]
pub struct RenderOptions {
    /// Template ID
    pub template_id: String,

    /// Context variable as NAME=VALUE, repeatable
    #[arg(long = "var", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Field bag for `template get`
pub fn get_fields(template_id: &str, fields: &[String]) -> FieldBag {
    FieldBag::new()
        .with("templateId", template_id)
        .with("fields", json!(fields))
}

/// Field bag for `template render`
pub fn render_fields(template_id: &str, variables: &[(String, String)]) -> FieldBag {
    let variables: Vec<_> = variables
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();

    FieldBag::new()
        .with("templateId", template_id)
        .with("variables", json!({ "variable": variables }))
}

pub async fn list_templates_data(global: &crate::Global) -> Result<OutputRecord> {
    dispatch_single(
        ResourceKind::Template,
        OperationKind::GetAll,
        FieldBag::new(),
        global,
    )
    .await
}

pub async fn get_template_data(options: &GetOptions, global: &crate::Global) -> Result<OutputRecord> {
    dispatch_single(
        ResourceKind::Template,
        OperationKind::GetOne,
        get_fields(&options.template_id, &options.fields),
        global,
    )
    .await
}

pub async fn render_template_data(
    options: &RenderOptions,
    global: &crate::Global,
) -> Result<OutputRecord> {
    dispatch_single(
        ResourceKind::Template,
        OperationKind::Render,
        render_fields(&options.template_id, &options.variables),
        global,
    )
    .await
}

/// Run template commands
pub async fn run(cmd: Commands, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running template command...");
    }

    match cmd {
        Commands::List(options) => {
            let record = list_templates_data(&global).await?;
            print_records(&[record], options.json, false)
        }
        Commands::Get(options) => {
            let record = get_template_data(&options, &global).await?;
            print_records(&[record], options.json, false)
        }
        Commands::Render(options) => {
            let record = render_template_data(&options, &global).await?;
            print_records(&[record], options.json, false)
        }
    }
}
