//! API credentials, revisions and request headers

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DispatchError;
use crate::request::RequestDescriptor;

/// Default Klaviyo API base URL
pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com/api";

/// Media type for both request bodies and responses
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Revision used when none is configured
pub const DEFAULT_REVISION: &str = "2025-01-15";

/// Revisions the request shapes were checked against, newest first
pub const KNOWN_REVISIONS: [&str; 6] = [
    "2025-01-15",
    "2024-10-15",
    "2024-07-15",
    "2024-06-15",
    "2024-05-15",
    "2024-02-15",
];

/// Private API key plus the API revision it talks to
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub revision: String,
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &mask_token(&self.token))
            .field("revision", &self.revision)
            .finish()
    }
}

impl Credentials {
    pub fn new(token: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            revision: revision.into(),
        }
    }
}

/// Result of checking a revision string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionStatus {
    Known,
    /// Well formed but not in [`KNOWN_REVISIONS`]
    Unknown,
}

static REVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").unwrap());

/// Validate a revision date
pub fn check_revision(revision: &str) -> Result<RevisionStatus, DispatchError> {
    if !REVISION_RE.is_match(revision) {
        return Err(DispatchError::InvalidRevision(revision.to_string()));
    }

    if KNOWN_REVISIONS.contains(&revision) {
        Ok(RevisionStatus::Known)
    } else {
        Ok(RevisionStatus::Unknown)
    }
}

/// Headers sent with every call
///
/// Returned as name/value pairs so the transport decides how to encode them.
pub fn auth_headers(credentials: &Credentials) -> Vec<(&'static str, String)> {
    vec![
        (
            "authorization",
            format!("Klaviyo-API-Key {}", credentials.token),
        ),
        ("revision", credentials.revision.clone()),
        ("accept", JSON_API_MEDIA_TYPE.to_string()),
        ("content-type", JSON_API_MEDIA_TYPE.to_string()),
    ]
}

/// Request used to verify a key can reach the API
pub fn credential_test_request() -> RequestDescriptor {
    RequestDescriptor::read("/events")
}

/// Mask a token for display, keeping a short prefix
pub fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 8 {
        "*".repeat(count)
    } else {
        format!("{}...", token.chars().take(6).collect::<String>())
    }
}
