//! Directory port over identity records held by the auth collaborator.

use crate::identity::domain::{IdentityRecord, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity directory operations.
pub type IdentityDirectoryResult<T> = Result<T, IdentityDirectoryError>;

/// Identity record lookup, liveness and removal contract.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Inserts or replaces an identity record.
    async fn upsert(&self, record: &IdentityRecord) -> IdentityDirectoryResult<()>;

    /// Finds an identity record by identifier.
    ///
    /// Returns `None` when the identity does not exist.
    async fn find_by_id(&self, id: &UserId) -> IdentityDirectoryResult<Option<IdentityRecord>>;

    /// Flags an identity as being removed. From then on
    /// [`Self::is_active`] reports `false` for it, so no new records can be
    /// attached to it while its owned data is deleted.
    ///
    /// Returns `false` when no record existed.
    async fn begin_removal(&self, id: &UserId) -> IdentityDirectoryResult<bool>;

    /// Returns `true` when the identity exists and is not being removed.
    async fn is_active(&self, id: &UserId) -> IdentityDirectoryResult<bool>;

    /// Removes an identity record together with its removal flag.
    ///
    /// Returns `false` when no record existed.
    async fn remove(&self, id: &UserId) -> IdentityDirectoryResult<bool>;
}

/// Errors returned by identity directory implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityDirectoryError {
    /// Backend failure.
    #[error("identity directory error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityDirectoryError {
    /// Wraps a backend error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
