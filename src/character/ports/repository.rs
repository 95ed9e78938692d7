//! Repository port for character persistence.

use crate::character::domain::{CharacterDomainError, CharacterId, CharacterPatch, UserIpCharacter};
use crate::identity::domain::UserId;
use crate::page::PageRequest;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for character repository operations.
pub type CharacterRepositoryResult<T> = Result<T, CharacterRepositoryError>;

/// Character persistence contract.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Stores a new character.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterRepositoryError::DuplicateCharacter`] when the ID
    /// already exists.
    async fn store(&self, character: &UserIpCharacter) -> CharacterRepositoryResult<()>;

    /// Finds a character by identifier.
    async fn find_by_id(&self, id: CharacterId)
    -> CharacterRepositoryResult<Option<UserIpCharacter>>;

    /// Returns one page of the owner's characters, newest first with the
    /// character ID descending as tie-breaker.
    async fn list_by_owner(
        &self,
        owner: &UserId,
        page: PageRequest,
    ) -> CharacterRepositoryResult<Vec<UserIpCharacter>>;

    /// Applies `patch` to the stored character in one atomic step and
    /// returns the result.
    ///
    /// Only the fields the patch sets are written, so concurrent patches to
    /// different fields all survive. The owner and `created_at` columns are
    /// never rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterRepositoryError::NotFound`] when the character does
    /// not exist and [`CharacterRepositoryError::InvalidPatch`] when the
    /// patch changes nothing.
    async fn apply_patch(
        &self,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> CharacterRepositoryResult<UserIpCharacter>;

    /// Deletes a character. Returns `false` when it did not exist.
    async fn delete(&self, id: CharacterId) -> CharacterRepositoryResult<bool>;

    /// Deletes every character owned by `owner` and returns how many were
    /// removed.
    async fn delete_by_owner(&self, owner: &UserId) -> CharacterRepositoryResult<u64>;
}

/// Errors returned by character repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CharacterRepositoryError {
    /// A character with the same identifier already exists.
    #[error("duplicate character identifier: {0}")]
    DuplicateCharacter(CharacterId),

    /// The character was not found.
    #[error("character not found: {0}")]
    NotFound(CharacterId),

    /// The patch was rejected by the character aggregate.
    #[error(transparent)]
    InvalidPatch(#[from] CharacterDomainError),

    /// The database cancelled the call at the storage deadline and rolled
    /// it back.
    #[error("storage deadline exceeded")]
    DeadlineExceeded,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CharacterRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
