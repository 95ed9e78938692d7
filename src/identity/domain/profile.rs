//! Identity records and their restricted profile projection.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata keys consulted, in order, when deriving a username.
const USERNAME_KEYS: [&str; 3] = ["username", "user_name", "preferred_username"];

/// Identity record as held by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Identity identifier.
    pub id: UserId,
    /// Primary email address, if known.
    pub email: Option<String>,
    /// Free-form user metadata supplied at sign-up.
    pub user_metadata: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Most recent sign-in, if the user ever signed in.
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    /// Creates a record with empty metadata and no sign-in.
    #[must_use]
    pub fn new(id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: None,
            user_metadata: Value::Object(serde_json::Map::new()),
            created_at,
            updated_at: created_at,
            last_sign_in_at: None,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the user metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.user_metadata = metadata;
        self
    }

    /// Sets the last sign-in timestamp.
    #[must_use]
    pub const fn with_last_sign_in(mut self, at: DateTime<Utc>) -> Self {
        self.last_sign_in_at = Some(at);
        self
    }
}

/// Read-only projection of an identity record exposed to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    /// Identity identifier.
    pub id: UserId,
    /// Primary email address, if known.
    pub email: Option<String>,
    /// Username derived from metadata.
    pub username: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Most recent sign-in.
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<&IdentityRecord> for ProfileView {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            id: record.id.clone(),
            email: record.email.clone(),
            username: derive_username(&record.user_metadata),
            created_at: record.created_at,
            updated_at: record.updated_at,
            last_sign_in_at: record.last_sign_in_at,
        }
    }
}

/// Picks the first non-blank string among the known username keys.
fn derive_username(metadata: &Value) -> Option<String> {
    USERNAME_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(ToOwned::to_owned)
}
