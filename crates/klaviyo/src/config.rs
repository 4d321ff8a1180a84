use klaviyo_core::credentials::{check_revision, RevisionStatus};
use klaviyo_core::Credentials;

use crate::prelude::*;

/// Klaviyo configuration resolved from flags and environment variables
#[derive(Debug, Clone)]
pub struct KlaviyoConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl KlaviyoConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Load configuration from the global options
    ///
    /// The global options already fall back to `KLAVIYO_API_KEY`,
    /// `KLAVIYO_REVISION` and `KLAVIYO_BASE_URL`.
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let api_key = global
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "KLAVIYO_API_KEY environment variable not set (or pass --api-key)".into(),
                )
            })?;

        let config = Self::new(
            global.base_url.clone(),
            Credentials::new(api_key, global.revision.clone()),
        );
        config.validate()?;

        Ok(config)
    }

    /// Reject malformed revisions and base URLs, warn on revisions we do not know
    pub fn validate(&self) -> Result<()> {
        match check_revision(&self.credentials.revision).map_err(Error::from)? {
            RevisionStatus::Known => {}
            RevisionStatus::Unknown => log::warn!(
                "Revision {} is not one of the known revisions; request shapes may differ",
                self.credentials.revision
            ),
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::Config(format!("Invalid base URL: {}", self.base_url)).into());
        }

        Ok(())
    }
}
