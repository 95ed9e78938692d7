//! Operations, entity kinds and authorization outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operation a caller wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Read a record or object.
    Read,
    /// Create a record or upload an object.
    Insert,
    /// Modify an existing record or object.
    Update,
    /// Remove a record or object.
    Delete,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 4] = [Self::Read, Self::Insert, Self::Update, Self::Delete];

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operation name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown operation: {0}")]
pub struct ParseOperationError(pub String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == value)
            .ok_or_else(|| ParseOperationError(value.to_owned()))
    }
}

/// Kind of record an authorization request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A generation task.
    GenerationTask,
    /// A user-owned character.
    UserIpCharacter,
    /// A profile projection of an identity record.
    Profile,
    /// An object in the asset bucket.
    Asset,
}

impl EntityType {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GenerationTask => "generation_task",
            Self::UserIpCharacter => "user_ip_character",
            Self::Profile => "profile",
            Self::Asset => "asset",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation must not reach storage.
    Deny,
}

impl Decision {
    /// Converts a predicate result into a decision.
    #[must_use]
    pub const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }

    /// Returns `true` for [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}
