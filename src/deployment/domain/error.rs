//! Error types for deployment domain validation and event parsing.

use thiserror::Error;

/// Errors returned while constructing deployment domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeploymentDomainError {
    /// A required identifier was empty after trimming.
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    /// The inbound push notification lacked a required field.
    #[error("malformed image push event: {0}")]
    MalformedEvent(String),
}
