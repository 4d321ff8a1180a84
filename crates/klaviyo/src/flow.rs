use klaviyo_core::{FieldBag, OperationKind, OutputRecord, ResourceKind};

use crate::dispatch::{dispatch_single, print_records};
use crate::prelude::{println, *};

/// Flow commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List flows
    #[clap(name = "list")]
    List(ListOptions),
}

/// Options for listing flows
#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fetch the flow list
pub async fn list_flows_data(global: &crate::Global) -> Result<OutputRecord> {
    dispatch_single(
        ResourceKind::Flow,
        OperationKind::GetAll,
        FieldBag::new(),
        global,
    )
    .await
}

/// Run flow commands
pub async fn run(cmd: Commands, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running flow command...");
    }

    match cmd {
        Commands::List(options) => {
            let record = list_flows_data(&global).await?;
            print_records(&[record], options.json, false)
        }
    }
}
