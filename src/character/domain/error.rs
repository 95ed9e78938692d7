//! Error types for character domain validation.

use crate::access::AccessDomainError;
use crate::identity::domain::IdentityDomainError;
use thiserror::Error;

/// Errors returned while constructing or enriching characters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CharacterDomainError {
    /// The character name is empty after trimming.
    #[error("character name must not be empty")]
    EmptyName,

    /// The name exceeds [`MAX_NAME_CHARS`](super::MAX_NAME_CHARS).
    #[error("character name must not exceed {max} characters, got {actual}")]
    NameTooLong {
        /// Largest accepted length.
        max: usize,
        /// Length supplied.
        actual: usize,
    },

    /// The main image reference is missing or blank.
    #[error("character main image reference must not be empty")]
    MissingMainImage,

    /// The owner identifier is malformed.
    #[error(transparent)]
    InvalidOwner(#[from] IdentityDomainError),

    /// An optional asset reference is malformed.
    #[error(transparent)]
    InvalidAsset(#[from] AccessDomainError),

    /// An update carried no changes.
    #[error("character update must change at least one field")]
    EmptyPatch,
}
