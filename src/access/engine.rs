//! Record-level authorization for tasks, characters and profiles.

use super::{AccessDenied, Decision, EntityType, Operation};
use crate::identity::domain::{IdentityContext, UserId};
use tracing::trace;

/// A persisted record whose access is governed by an owner identity.
pub trait OwnedRecord {
    /// Entity kind used to select the rule set.
    const ENTITY: EntityType;

    /// Returns the owning identity, or `None` for anonymous records.
    fn owner(&self) -> Option<&UserId>;
}

/// Stateless evaluator of the per-entity ownership rules.
///
/// - Generation tasks: `read`, `insert` and `update` are allowed when the
///   record is anonymous or owned by the caller. No predicate grants
///   `delete`. Service-role callers are allowed every operation.
/// - Characters: every operation requires an exact owner match. There is no
///   anonymous mode and no service bypass.
/// - Profiles: only `read`, and only of the caller's own profile.
/// - Assets are never decided here; see [`super::StorageAccessPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessControlEngine;

impl AccessControlEngine {
    /// Decides whether `identity` may perform `operation` on a record of
    /// kind `entity` owned by `owner`.
    #[must_use]
    pub fn authorize(
        identity: &IdentityContext,
        operation: Operation,
        entity: EntityType,
        owner: Option<&UserId>,
    ) -> Decision {
        let decision = match entity {
            EntityType::GenerationTask => Self::task_rule(identity, operation, owner),
            EntityType::UserIpCharacter => Self::character_rule(identity, owner),
            EntityType::Profile => Self::profile_rule(identity, operation, owner),
            EntityType::Asset => Decision::Deny,
        };
        trace!(
            %operation,
            %entity,
            role = %identity.role(),
            ?decision,
            "record authorization evaluated"
        );
        decision
    }

    /// Decides access to a concrete record.
    #[must_use]
    pub fn authorize_record<R: OwnedRecord>(
        identity: &IdentityContext,
        operation: Operation,
        record: &R,
    ) -> Decision {
        Self::authorize(identity, operation, R::ENTITY, record.owner())
    }

    /// Returns `true` when `identity` may see `record`.
    #[must_use]
    pub fn can_read<R: OwnedRecord>(identity: &IdentityContext, record: &R) -> bool {
        Self::authorize_record(identity, Operation::Read, record).is_allowed()
    }

    /// Like [`Self::authorize`] but converts a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the rule denies the operation.
    pub fn require(
        identity: &IdentityContext,
        operation: Operation,
        entity: EntityType,
        owner: Option<&UserId>,
    ) -> Result<(), AccessDenied> {
        if Self::authorize(identity, operation, entity, owner).is_allowed() {
            Ok(())
        } else {
            Err(AccessDenied { operation, entity })
        }
    }

    fn task_rule(
        identity: &IdentityContext,
        operation: Operation,
        owner: Option<&UserId>,
    ) -> Decision {
        if identity.is_service() {
            return Decision::Allow;
        }
        let visible = owner.is_none_or(|user| identity.is_user(user));
        match operation {
            Operation::Read | Operation::Insert | Operation::Update => Decision::from_bool(visible),
            Operation::Delete => Decision::Deny,
        }
    }

    fn character_rule(identity: &IdentityContext, owner: Option<&UserId>) -> Decision {
        Decision::from_bool(owner.is_some_and(|user| identity.is_user(user)))
    }

    fn profile_rule(
        identity: &IdentityContext,
        operation: Operation,
        owner: Option<&UserId>,
    ) -> Decision {
        let own = owner.is_some_and(|user| identity.is_user(user));
        Decision::from_bool(own && operation == Operation::Read)
    }
}
