//! Account removal with cascade to owned tasks and characters.

use crate::character::ports::{CharacterRepository, CharacterRepositoryError};
use crate::config::EngineConfig;
use crate::error::ErrorKind;
use crate::identity::{
    domain::{IdentityContext, UserId},
    ports::{IdentityDirectory, IdentityDirectoryError},
};
use crate::task::ports::{GenerationTaskRepository, TaskRepositoryError};
use crate::timeout::{StorageTimeout, bounded};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Counts of records removed with an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemovalSummary {
    /// Generation tasks deleted.
    pub tasks: u64,
    /// Characters deleted.
    pub characters: u64,
    /// Whether an identity record existed and was removed.
    pub identity_removed: bool,
}

/// Errors returned by [`AccountRemovalService`].
#[derive(Debug, Error)]
pub enum AccountRemovalError {
    /// Only the account itself or a service-role caller may remove it.
    #[error("caller may not remove account {0}")]
    Unauthorized(UserId),

    /// A storage call timed out. Earlier steps may already have run; the
    /// removal is safe to retry.
    #[error(transparent)]
    Timeout(#[from] StorageTimeout),

    /// Task deletion failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// Character deletion failed.
    #[error(transparent)]
    Characters(#[from] CharacterRepositoryError),

    /// Identity record removal failed.
    #[error(transparent)]
    Directory(#[from] IdentityDirectoryError),
}

impl AccountRemovalError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Tasks(_) | Self::Characters(_) | Self::Directory(_) => ErrorKind::Persistence,
        }
    }
}

/// Removes an identity and everything it owns.
///
/// The identity is flagged as being removed before anything is deleted, so
/// the task and character services refuse new records for it while the
/// cascade runs. Owned records go next and the identity record last, which
/// keeps a partially failed removal retryable.
#[derive(Clone)]
pub struct AccountRemovalService<T, Ch, D>
where
    T: GenerationTaskRepository,
    Ch: CharacterRepository,
    D: IdentityDirectory,
{
    tasks: Arc<T>,
    characters: Arc<Ch>,
    directory: Arc<D>,
    backstop: Duration,
}

impl<T, Ch, D> AccountRemovalService<T, Ch, D>
where
    T: GenerationTaskRepository,
    Ch: CharacterRepository,
    D: IdentityDirectory,
{
    /// Creates a removal service over the three stores.
    #[must_use]
    pub fn new(tasks: Arc<T>, characters: Arc<Ch>, directory: Arc<D>) -> Self {
        Self {
            tasks,
            characters,
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

    /// Flags `user_id` as being removed, deletes the tasks and characters it
    /// owns, then removes the identity record itself.
    ///
    /// Removing an account that has nothing left is not an error; the
    /// summary reports zero counts.
    ///
    /// # Errors
    ///
    /// Returns [`AccountRemovalError::Unauthorized`] unless the caller is
    /// `user_id` or has the service role, or a storage error.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn remove(
        &self,
        identity: &IdentityContext,
        user_id: &UserId,
    ) -> Result<RemovalSummary, AccountRemovalError> {
        if !identity.is_service() && !identity.is_user(user_id) {
            warn!("account removal denied");
            return Err(AccountRemovalError::Unauthorized(user_id.clone()));
        }

        bounded(
            self.backstop,
            "begin_removal",
            self.directory.begin_removal(user_id),
        )
        .await??;
        let tasks = bounded(
            self.backstop,
            "delete_tasks_by_owner",
            self.tasks.delete_by_owner(user_id),
        )
        .await??;
        let characters = bounded(
            self.backstop,
            "delete_characters_by_owner",
            self.characters.delete_by_owner(user_id),
        )
        .await??;
        let identity_removed = bounded(
            self.backstop,
            "remove_identity",
            self.directory.remove(user_id),
        )
        .await??;

        let summary = RemovalSummary {
            tasks,
            characters,
            identity_removed,
        };
        info!(%user_id, tasks, characters, identity_removed, "account removed");
        Ok(summary)
    }
}
