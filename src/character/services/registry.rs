//! Owner-scoped CRUD over user characters.

use crate::access::{AccessControlEngine, AccessDenied, EntityType, Operation};
use crate::character::{
    domain::{CharacterDomainError, CharacterDraft, CharacterId, CharacterPatch, UserIpCharacter},
    ports::{CharacterRepository, CharacterRepositoryError},
};
use crate::config::EngineConfig;
use crate::error::ErrorKind;
use crate::identity::domain::{IdentityContext, UserId};
use crate::identity::ports::{IdentityDirectory, IdentityDirectoryError};
use crate::page::{PageLimits, PageRequest};
use crate::task::domain::{GenerationStatus, TaskId};
use crate::timeout::{StorageTimeout, bounded};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Request payload for creating a character owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCharacterRequest {
    name: String,
    main_image_ref: String,
    description: Option<String>,
    source_task_id: Option<TaskId>,
}

impl CreateCharacterRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, main_image_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_image_ref: main_image_ref.into(),
            description: None,
            source_task_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Links the character to the task that produced it.
    #[must_use]
    pub const fn with_source_task(mut self, task_id: TaskId) -> Self {
        self.source_task_id = Some(task_id);
        self
    }
}

/// Service-level errors for character registry operations.
#[derive(Debug, Error)]
pub enum CharacterRegistryError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] CharacterDomainError),

    /// The caller may not perform the write.
    #[error(transparent)]
    Unauthorized(#[from] AccessDenied),

    /// The owner does not exist or is being removed.
    #[error("owner {0} is not an active identity")]
    InactiveOwner(UserId),

    /// No character owned by the caller has this identifier.
    #[error("character not found: {0}")]
    NotFound(CharacterId),

    /// The service stopped waiting for storage; the outcome is unknown.
    #[error(transparent)]
    Timeout(#[from] StorageTimeout),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(CharacterRepositoryError),

    /// The identity directory could not be consulted.
    #[error(transparent)]
    Directory(#[from] IdentityDirectoryError),
}

impl From<CharacterRepositoryError> for CharacterRegistryError {
    fn from(err: CharacterRepositoryError) -> Self {
        match err {
            CharacterRepositoryError::NotFound(id) => Self::NotFound(id),
            CharacterRepositoryError::InvalidPatch(err) => Self::Domain(err),
            other => Self::Repository(other),
        }
    }
}

impl CharacterRegistryError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::Unauthorized(_) | Self::InactiveOwner(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout(_) | Self::Repository(CharacterRepositoryError::DeadlineExceeded) => {
                ErrorKind::Timeout
            }
            Self::Repository(_) | Self::Directory(_) => ErrorKind::Persistence,
        }
    }
}

/// Result type for character registry operations.
pub type CharacterRegistryResult<T> = Result<T, CharacterRegistryError>;

/// Character registry orchestration service.
///
/// Characters of other owners are invisible: reading, updating or deleting
/// one fails with [`CharacterRegistryError::NotFound`].
#[derive(Clone)]
pub struct CharacterRegistryService<R, C>
where
    R: CharacterRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<dyn IdentityDirectory>,
    clock: Arc<C>,
    backstop: Duration,
    pages: PageLimits,
}

impl<R, C> CharacterRegistryService<R, C>
where
    R: CharacterRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new character registry service with default settings.
    ///
    /// `directory` decides which owners may still receive new characters.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<dyn IdentityDirectory>, clock: Arc<C>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            repository,
            directory,
            clock,
            backstop: defaults.storage_backstop(),
            pages: defaults.page_limits(),
        }
    }

    /// Applies timeout and paging settings from `config`.
    #[must_use]
    pub const fn with_config(mut self, config: &EngineConfig) -> Self {
        self.backstop = config.storage_backstop();
        self.pages = config.page_limits();
        self
    }

    /// Creates a character owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterRegistryError::Unauthorized`] for callers without a
    /// user identity, [`CharacterRegistryError::InactiveOwner`] when the
    /// caller's account is missing or being removed,
    /// [`CharacterRegistryError::Domain`] for a blank name or main image, or a
    /// storage error.
    #[instrument(skip(self, identity, request), fields(role = %identity.role()))]
    pub async fn create(
        &self,
        identity: &IdentityContext,
        request: CreateCharacterRequest,
    ) -> CharacterRegistryResult<UserIpCharacter> {
        let Some(owner) = identity.user_id() else {
            warn!("character insert without user identity");
            return Err(AccessDenied {
                operation: Operation::Insert,
                entity: EntityType::UserIpCharacter,
            }
            .into());
        };

        let CreateCharacterRequest {
            name,
            main_image_ref,
            description,
            source_task_id,
        } = request;
        let mut draft = CharacterDraft::new(owner.clone(), name, main_image_ref)?;
        if let Some(text) = description {
            draft = draft.with_description(text);
        }
        if let Some(task_id) = source_task_id {
            draft = draft.with_source_task(task_id);
        }
        AccessControlEngine::require(
            identity,
            Operation::Insert,
            EntityType::UserIpCharacter,
            Some(draft.owner_id()),
        )?;

        let character = UserIpCharacter::create(draft, &*self.clock);
        self.require_active(owner).await?;
        self.bounded("store", self.repository.store(&character))
            .await??;
        // A removal flagged since the first check may already have swept the
        // owner's characters, so the insert is undone.
        if let Err(err) = self.require_active(owner).await {
            if matches!(err, CharacterRegistryError::InactiveOwner(_)) {
                self.bounded("delete", self.repository.delete(character.id()))
                    .await??;
            }
            return Err(err);
        }
        debug!(character_id = %character.id(), "character created");
        Ok(character)
    }

    /// Returns one of the caller's characters.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterRegistryError::NotFound`] when the character does
    /// not exist or belongs to someone else.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn get(
        &self,
        identity: &IdentityContext,
        character_id: CharacterId,
    ) -> CharacterRegistryResult<UserIpCharacter> {
        self.load_owned(identity, character_id).await
    }

    /// Lists the caller's characters, newest first.
    ///
    /// Callers without a user identity receive an empty page.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn list_mine(
        &self,
        identity: &IdentityContext,
        page: PageRequest,
    ) -> CharacterRegistryResult<Vec<UserIpCharacter>> {
        let Some(owner) = identity.user_id() else {
            return Ok(Vec::new());
        };
        let clamped = page.clamped(self.pages);
        Ok(self
            .bounded("list_by_owner", self.repository.list_by_owner(owner, clamped))
            .await??)
    }

    /// Applies an enrichment patch to one of the caller's characters.
    ///
    /// The repository writes only the fields the patch sets, so concurrent
    /// enrichments of different fields do not overwrite each other.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterRegistryError::NotFound`] for characters the caller
    /// does not own, [`CharacterRegistryError::Domain`] for an empty patch,
    /// or a storage error.
    #[instrument(skip(self, identity, patch), fields(role = %identity.role()))]
    pub async fn update(
        &self,
        identity: &IdentityContext,
        character_id: CharacterId,
        patch: CharacterPatch,
    ) -> CharacterRegistryResult<UserIpCharacter> {
        let current = self.load_owned(identity, character_id).await?;
        AccessControlEngine::require(
            identity,
            Operation::Update,
            EntityType::UserIpCharacter,
            Some(current.owner_id()),
        )?;
        if patch.is_empty() {
            return Err(CharacterDomainError::EmptyPatch.into());
        }
        let character = self
            .bounded(
                "apply_patch",
                self.repository.apply_patch(character_id, patch),
            )
            .await??;
        debug!(%character_id, "character updated");
        Ok(character)
    }

    /// Records the latest merchandise sub-job status.
    ///
    /// Any status may follow any other; the registry keeps the last value.
    ///
    /// # Errors
    ///
    /// As for [`Self::update`].
    pub async fn set_merchandise_status(
        &self,
        identity: &IdentityContext,
        character_id: CharacterId,
        status: GenerationStatus,
    ) -> CharacterRegistryResult<UserIpCharacter> {
        let patch = CharacterPatch::new().with_merchandise_status(status);
        self.update(identity, character_id, patch).await
    }

    /// Deletes one of the caller's characters.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterRegistryError::NotFound`] for characters the caller
    /// does not own, or a storage error.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn delete(
        &self,
        identity: &IdentityContext,
        character_id: CharacterId,
    ) -> CharacterRegistryResult<()> {
        let character = self.load_owned(identity, character_id).await?;
        AccessControlEngine::require(
            identity,
            Operation::Delete,
            EntityType::UserIpCharacter,
            Some(character.owner_id()),
        )?;
        let removed = self
            .bounded("delete", self.repository.delete(character_id))
            .await??;
        if !removed {
            return Err(CharacterRegistryError::NotFound(character_id));
        }
        debug!(%character_id, "character deleted");
        Ok(())
    }

    async fn load_owned(
        &self,
        identity: &IdentityContext,
        character_id: CharacterId,
    ) -> CharacterRegistryResult<UserIpCharacter> {
        let found = self
            .bounded("find_by_id", self.repository.find_by_id(character_id))
            .await??;
        match found {
            Some(character) if AccessControlEngine::can_read(identity, &character) => {
                Ok(character)
            }
            Some(_) => {
                debug!(%character_id, "character hidden from caller");
                Err(CharacterRegistryError::NotFound(character_id))
            }
            None => Err(CharacterRegistryError::NotFound(character_id)),
        }
    }

    async fn require_active(&self, owner: &UserId) -> CharacterRegistryResult<()> {
        if self
            .bounded("is_active", self.directory.is_active(owner))
            .await??
        {
            Ok(())
        } else {
            warn!(%owner, "character insert for inactive owner");
            Err(CharacterRegistryError::InactiveOwner(owner.clone()))
        }
    }

    async fn bounded<F, T>(
        &self,
        operation: &'static str,
        future: F,
    ) -> Result<T, StorageTimeout>
    where
        F: Future<Output = T>,
    {
        bounded(self.backstop, operation, future).await
    }
}
