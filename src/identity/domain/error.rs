//! Error types for identity domain validation.

use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The user identifier contains a path separator or whitespace.
    #[error("invalid user identifier '{0}': must not contain '/' or whitespace")]
    InvalidUserId(String),
}
