//! Caller-facing error taxonomy shared by all services.
//!
//! Each service keeps its own error enum so callers can match on detail, and
//! every one of them classifies itself into an [`ErrorKind`] so the API layer
//! can map failures uniformly (status codes, retry policy).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a per-request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The authorization predicate rejected a write.
    Unauthorized,
    /// The task state machine rejected the requested edge.
    InvalidTransition,
    /// A required field was missing or malformed.
    #[serde(rename = "validation_error")]
    Validation,
    /// No visible record matched the identifier or owner filter.
    NotFound,
    /// A concurrent mutation won the race for the same record.
    Conflict,
    /// The storage call did not finish within the configured timeout.
    Timeout,
    /// The storage backend failed.
    Persistence,
}

impl ErrorKind {
    /// Returns `true` when repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Conflict | Self::Timeout)
    }

    /// Returns the canonical snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidTransition => "invalid_transition",
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Timeout => "timeout",
            Self::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
