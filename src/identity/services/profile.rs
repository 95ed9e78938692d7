//! Read-only profile lookups restricted to the caller's own record.

use crate::access::{AccessControlEngine, EntityType, Operation};
use crate::config::EngineConfig;
use crate::error::ErrorKind;
use crate::identity::{
    domain::{IdentityContext, ProfileView, UserId},
    ports::{IdentityDirectory, IdentityDirectoryError},
};
use crate::timeout::{StorageTimeout, bounded};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors returned by [`ProfileViewService`].
#[derive(Debug, Error)]
pub enum ProfileViewError {
    /// No profile visible to the caller has this identifier.
    #[error("profile not found: {0}")]
    NotFound(UserId),

    /// The directory call timed out.
    #[error(transparent)]
    Timeout(#[from] StorageTimeout),

    /// Directory operation failed.
    #[error(transparent)]
    Directory(#[from] IdentityDirectoryError),
}

impl ProfileViewError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Directory(_) => ErrorKind::Persistence,
        }
    }
}

/// Serves [`ProfileView`] projections.
#[derive(Clone)]
pub struct ProfileViewService<D>
where
    D: IdentityDirectory,
{
    directory: Arc<D>,
    backstop: Duration,
}

impl<D> ProfileViewService<D>
where
    D: IdentityDirectory,
{
    /// Creates a service with the default storage timeout.
    #[must_use]
    pub fn new(directory: Arc<D>) -> Self {
        Self {
            directory,
            backstop: EngineConfig::default().storage_backstop(),
        }
    }

    /// Applies the storage timeout from `config`.
    #[must_use]
    pub const fn with_config(mut self, config: &EngineConfig) -> Self {
        self.backstop = config.storage_backstop();
        self
    }

    /// Returns the profile of `user_id` if it belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileViewError::NotFound`] when the record does not exist
    /// or belongs to someone else, including service-role callers.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn get(
        &self,
        identity: &IdentityContext,
        user_id: &UserId,
    ) -> Result<ProfileView, ProfileViewError> {
        let decision = AccessControlEngine::authorize(
            identity,
            Operation::Read,
            EntityType::Profile,
            Some(user_id),
        );
        if !decision.is_allowed() {
            debug!("profile hidden from caller");
            return Err(ProfileViewError::NotFound(user_id.clone()));
        }
        let record = bounded(
            self.backstop,
            "find_by_id",
            self.directory.find_by_id(user_id),
        )
        .await??;
        record
            .as_ref()
            .map(ProfileView::from)
            .ok_or_else(|| ProfileViewError::NotFound(user_id.clone()))
    }
}
