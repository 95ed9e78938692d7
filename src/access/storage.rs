//! Authorization for objects in the asset bucket.

use super::{AccessDenied, AssetBucket, AssetPath, BucketVisibility, Decision, EntityType, Operation};
use crate::identity::domain::IdentityContext;
use tracing::{debug, instrument};

/// Path-based access rules for stored assets.
///
/// Insert is looser than update and delete: any signed-in user, and the
/// service role that uploads generation results, may write anywhere in the
/// bucket. Only the identity named by the path's owner folder may overwrite
/// or remove the object afterwards; the service role has no bypass there.
/// Guests may never insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccessPolicy {
    bucket: AssetBucket,
}

impl StorageAccessPolicy {
    /// Creates a policy bound to `bucket`.
    #[must_use]
    pub const fn new(bucket: AssetBucket) -> Self {
        Self { bucket }
    }

    /// Returns the bucket this policy governs.
    #[must_use]
    pub const fn bucket(&self) -> &AssetBucket {
        &self.bucket
    }

    /// Decides whether `identity` may perform `operation` on `path` in a
    /// bucket with the given visibility.
    #[must_use]
    pub fn authorize_asset(
        identity: &IdentityContext,
        operation: Operation,
        path: &AssetPath,
        visibility: BucketVisibility,
    ) -> Decision {
        let owns_path = identity.user_id().is_some_and(|user| path.is_owned_by(user));
        let allowed = match operation {
            Operation::Read => visibility == BucketVisibility::Public || owns_path,
            Operation::Insert => identity.is_authenticated() || identity.is_service(),
            Operation::Update | Operation::Delete => owns_path,
        };
        Decision::from_bool(allowed)
    }

    /// Decides access using this policy's bucket visibility.
    #[must_use]
    pub fn authorize(
        &self,
        identity: &IdentityContext,
        operation: Operation,
        path: &AssetPath,
    ) -> Decision {
        Self::authorize_asset(identity, operation, path, self.bucket.visibility)
    }

    /// Like [`Self::authorize`] but converts a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the operation is not permitted.
    #[instrument(skip(self, identity, path), fields(bucket = %self.bucket.name, path = %path))]
    pub fn require(
        &self,
        identity: &IdentityContext,
        operation: Operation,
        path: &AssetPath,
    ) -> Result<(), AccessDenied> {
        if self.authorize(identity, operation, path).is_allowed() {
            return Ok(());
        }
        debug!(%operation, "asset access denied");
        Err(AccessDenied {
            operation,
            entity: EntityType::Asset,
        })
    }
}

impl Default for StorageAccessPolicy {
    fn default() -> Self {
        Self::new(AssetBucket::generated_images())
    }
}
