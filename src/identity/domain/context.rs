//! Request-scoped caller identity.

use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Privilege level of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary end-user or guest.
    #[default]
    Standard,
    /// Backend worker allowed to bypass task ownership checks.
    Service,
}

impl Role {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the caller making a request.
///
/// Supplied by the external authentication collaborator; this crate never
/// issues or verifies credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityContext {
    user_id: Option<UserId>,
    role: Role,
}

impl IdentityContext {
    /// Creates a standard-role identity for an authenticated user.
    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::Standard,
        }
    }

    /// Creates an unauthenticated guest identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            role: Role::Standard,
        }
    }

    /// Creates a privileged service identity with no user attached.
    #[must_use]
    pub const fn service() -> Self {
        Self {
            user_id: None,
            role: Role::Service,
        }
    }

    /// Creates an identity from its parts.
    #[must_use]
    pub const fn from_parts(user_id: Option<UserId>, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns the authenticated user identifier, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Returns the caller role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for service-role callers.
    #[must_use]
    pub const fn is_service(&self) -> bool {
        matches!(self.role, Role::Service)
    }

    /// Returns `true` when the caller carries a user identifier.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns `true` when the caller is exactly `owner`.
    #[must_use]
    pub fn is_user(&self, owner: &UserId) -> bool {
        self.user_id.as_ref() == Some(owner)
    }
}
