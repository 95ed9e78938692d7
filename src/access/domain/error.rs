//! Error types for access-control values.

use super::{EntityType, Operation};
use crate::error::ErrorKind;
use thiserror::Error;

/// Errors returned while constructing asset references and paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDomainError {
    /// The asset reference is empty after trimming.
    #[error("asset reference must not be empty")]
    EmptyAssetRef,

    /// The asset path is empty.
    #[error("asset path must not be empty")]
    EmptyAssetPath,

    /// The asset path is absolute, has empty segments, or navigates upwards.
    #[error("invalid asset path '{0}'")]
    InvalidAssetPath(String),

    /// The bucket name is empty after trimming.
    #[error("bucket name must not be empty")]
    EmptyBucketName,
}

/// A write was rejected by an authorization rule.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{operation} on {entity} denied")]
pub struct AccessDenied {
    /// Operation that was denied.
    pub operation: Operation,
    /// Entity kind the operation targeted.
    pub entity: EntityType,
}

impl AccessDenied {
    /// Classifies the denial for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Unauthorized
    }
}
