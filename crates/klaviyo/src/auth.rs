//! Credential checks

use colored::Colorize;
use klaviyo_core::credentials::{credential_test_request, mask_token};

use crate::client::{create_klaviyo_client, send_request};
use crate::config::KlaviyoConfig;
use crate::prelude::*;

/// Credential commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Verify the API key by listing events
    #[clap(name = "test")]
    Test,
}

/// Send the credential test request
pub async fn test_credentials_data(global: &crate::Global) -> Result<KlaviyoConfig> {
    let config = KlaviyoConfig::from_global(global)?;
    let client = create_klaviyo_client(&config)?;

    send_request(&client, &config.base_url, &credential_test_request())
        .await
        .map_err(|e| eyre!("Credential test failed: {}", e))?;

    Ok(config)
}

/// Run credential commands
pub async fn run(cmd: Commands, global: crate::Global) -> Result<()> {
    match cmd {
        Commands::Test => {
            let config = test_credentials_data(&global).await?;
            std::println!(
                "{} key {} (revision {})",
                "Credentials OK:".green().bold(),
                mask_token(&config.credentials.token).bright_black(),
                config.credentials.revision.bright_blue()
            );
            Ok(())
        }
    }
}
