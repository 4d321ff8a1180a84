//! Errors raised while turning a field bag into a request

use crate::resource::{OperationKind, ResourceKind};

/// Error type for request building
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown operation: {operation} is not supported for {resource}")]
    UnknownOperation {
        resource: ResourceKind,
        operation: OperationKind,
    },

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown operation name: {0}")]
    UnknownOperationName(String),

    #[error("Invalid revision '{0}': expected YYYY-MM-DD")]
    InvalidRevision(String),
}

impl DispatchError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DispatchError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
