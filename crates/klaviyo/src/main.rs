#![allow(unused)]

use crate::prelude::*;
use clap::Parser;
use klaviyo_core::{DEFAULT_BASE_URL, DEFAULT_REVISION};

mod auth;
mod client;
mod config;
mod dispatch;
mod error;
mod event;
mod flow;
mod mcp;
mod prelude;
mod template;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Build and send Klaviyo API requests from resource and operation selectors"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Klaviyo private API key
    #[clap(long, env = "KLAVIYO_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Klaviyo API revision (YYYY-MM-DD)
    #[clap(long, env = "KLAVIYO_REVISION", global = true, default_value = DEFAULT_REVISION)]
    revision: String,

    /// Klaviyo API base URL
    #[clap(long, env = "KLAVIYO_BASE_URL", global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Whether to display additional information.
    #[clap(long, env = "KLAVIYO_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Flow operations
    #[command(subcommand)]
    Flow(crate::flow::Commands),

    /// Template operations
    #[command(subcommand)]
    Template(crate::template::Commands),

    /// Event operations
    #[command(subcommand)]
    Event(crate::event::Commands),

    /// Run one request per input item from a resource and operation pair
    Dispatch(crate::dispatch::DispatchOptions),

    /// Credential operations
    #[command(subcommand)]
    Auth(crate::auth::Commands),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Flow(cmd) => crate::flow::run(cmd, app.global).await,
        SubCommands::Template(cmd) => crate::template::run(cmd, app.global).await,
        SubCommands::Event(cmd) => crate::event::run(cmd, app.global).await,
        SubCommands::Dispatch(options) => crate::dispatch::run(options, app.global).await,
        SubCommands::Auth(cmd) => crate::auth::run(cmd, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
