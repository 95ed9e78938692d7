//! Character aggregate, creation draft and enrichment patch.

use super::{CharacterDomainError, CharacterId};
use crate::access::{AssetRef, EntityType, OwnedRecord};
use crate::identity::domain::UserId;
use crate::task::domain::{GenerationStatus, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest name the `user_ip_characters.name` column holds.
pub const MAX_NAME_CHARS: usize = 200;

/// Validated input for a new character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDraft {
    owner_id: UserId,
    name: String,
    description: Option<String>,
    main_image_ref: AssetRef,
    source_task_id: Option<TaskId>,
}

impl CharacterDraft {
    /// Creates a draft with the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterDomainError::EmptyName`] for a blank name,
    /// [`CharacterDomainError::NameTooLong`] for a name longer than
    /// [`MAX_NAME_CHARS`] and [`CharacterDomainError::MissingMainImage`] for
    /// a blank main image.
    pub fn new(
        owner_id: UserId,
        name: impl Into<String>,
        main_image_ref: impl Into<String>,
    ) -> Result<Self, CharacterDomainError> {
        Ok(Self {
            owner_id,
            name: validate_name(name.into())?,
            description: None,
            main_image_ref: AssetRef::new(main_image_ref)
                .map_err(|_| CharacterDomainError::MissingMainImage)?,
            source_task_id: None,
        })
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

    /// Returns the owner.
    #[must_use]
    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}

impl OwnedRecord for CharacterDraft {
    const ENTITY: EntityType = EntityType::UserIpCharacter;

    fn owner(&self) -> Option<&UserId> {
        Some(&self.owner_id)
    }
}

/// Set of field changes applied to an existing character.
///
/// Unset fields are left untouched, which lets collaborators fill in views,
/// models and merchandise one at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterPatch {
    name: Option<String>,
    description: Option<String>,
    main_image_ref: Option<AssetRef>,
    left_view_ref: Option<AssetRef>,
    back_view_ref: Option<AssetRef>,
    model_3d_ref: Option<AssetRef>,
    merchandise_refs: Option<Value>,
    merchandise_status: Option<GenerationStatus>,
}

impl CharacterPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the character.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterDomainError::EmptyName`] for a blank name and
    /// [`CharacterDomainError::NameTooLong`] for an overlong one.
    pub fn rename(mut self, name: impl Into<String>) -> Result<Self, CharacterDomainError> {
        self.name = Some(validate_name(name.into())?);
        Ok(self)
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the main image.
    #[must_use]
    pub fn with_main_image(mut self, asset: AssetRef) -> Self {
        self.main_image_ref = Some(asset);
        self
    }

    /// Sets the left view image.
    #[must_use]
    pub fn with_left_view(mut self, asset: AssetRef) -> Self {
        self.left_view_ref = Some(asset);
        self
    }

    /// Sets the back view image.
    #[must_use]
    pub fn with_back_view(mut self, asset: AssetRef) -> Self {
        self.back_view_ref = Some(asset);
        self
    }

    /// Sets the 3D model.
    #[must_use]
    pub fn with_model_3d(mut self, asset: AssetRef) -> Self {
        self.model_3d_ref = Some(asset);
        self
    }

    /// Replaces the merchandise references.
    #[must_use]
    pub fn with_merchandise_refs(mut self, refs: Value) -> Self {
        self.merchandise_refs = Some(refs);
        self
    }

    /// Records the latest merchandise sub-job status.
    #[must_use]
    pub const fn with_merchandise_status(mut self, status: GenerationStatus) -> Self {
        self.merchandise_status = Some(status);
        self
    }

    /// Returns the new name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the new description, if set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the new main image, if set.
    #[must_use]
    pub const fn main_image_ref(&self) -> Option<&AssetRef> {
        self.main_image_ref.as_ref()
    }

    /// Returns the new left view, if set.
    #[must_use]
    pub const fn left_view_ref(&self) -> Option<&AssetRef> {
        self.left_view_ref.as_ref()
    }

    /// Returns the new back view, if set.
    #[must_use]
    pub const fn back_view_ref(&self) -> Option<&AssetRef> {
        self.back_view_ref.as_ref()
    }

    /// Returns the new 3D model, if set.
    #[must_use]
    pub const fn model_3d_ref(&self) -> Option<&AssetRef> {
        self.model_3d_ref.as_ref()
    }

    /// Returns the new merchandise references, if set.
    #[must_use]
    pub const fn merchandise_refs(&self) -> Option<&Value> {
        self.merchandise_refs.as_ref()
    }

    /// Returns the new merchandise status, if set.
    #[must_use]
    pub const fn merchandise_status(&self) -> Option<GenerationStatus> {
        self.merchandise_status
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.main_image_ref.is_none()
            && self.left_view_ref.is_none()
            && self.back_view_ref.is_none()
            && self.model_3d_ref.is_none()
            && self.merchandise_refs.is_none()
            && self.merchandise_status.is_none()
    }
}

/// Character aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIpCharacter {
    id: CharacterId,
    owner_id: UserId,
    name: String,
    description: Option<String>,
    main_image_ref: AssetRef,
    left_view_ref: Option<AssetRef>,
    back_view_ref: Option<AssetRef>,
    model_3d_ref: Option<AssetRef>,
    merchandise_refs: Option<Value>,
    merchandise_status: Option<GenerationStatus>,
    source_task_id: Option<TaskId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted character.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedCharacterData {
    /// Character identifier.
    pub id: CharacterId,
    /// Owning identity.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Main image reference.
    pub main_image_ref: AssetRef,
    /// Left view reference.
    pub left_view_ref: Option<AssetRef>,
    /// Back view reference.
    pub back_view_ref: Option<AssetRef>,
    /// 3D model reference.
    pub model_3d_ref: Option<AssetRef>,
    /// Merchandise references.
    pub merchandise_refs: Option<Value>,
    /// Merchandise sub-job status.
    pub merchandise_status: Option<GenerationStatus>,
    /// Task that produced the character.
    pub source_task_id: Option<TaskId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserIpCharacter {
    /// Creates a character from a validated draft.
    #[must_use]
    pub fn create(draft: CharacterDraft, clock: &impl Clock) -> Self {
        let CharacterDraft {
            owner_id,
            name,
            description,
            main_image_ref,
            source_task_id,
        } = draft;

        Self {
            id: CharacterId::new(),
            owner_id,
            name,
            description,
            main_image_ref,
            left_view_ref: None,
            back_view_ref: None,
            model_3d_ref: None,
            merchandise_refs: None,
            merchandise_status: None,
            source_task_id,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a character from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCharacterData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            name: data.name,
            description: data.description,
            main_image_ref: data.main_image_ref,
            left_view_ref: data.left_view_ref,
            back_view_ref: data.back_view_ref,
            model_3d_ref: data.model_3d_ref,
            merchandise_refs: data.merchandise_refs,
            merchandise_status: data.merchandise_status,
            source_task_id: data.source_task_id,
            created_at: data.created_at,
        }
    }

    /// Returns the character identifier.
    #[must_use]
    pub const fn id(&self) -> CharacterId {
        self.id
    }

    /// Returns the owning identity.
    #[must_use]
    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the main image reference.
    #[must_use]
    pub const fn main_image_ref(&self) -> &AssetRef {
        &self.main_image_ref
    }

    /// Returns the left view reference.
    #[must_use]
    pub const fn left_view_ref(&self) -> Option<&AssetRef> {
        self.left_view_ref.as_ref()
    }

    /// Returns the back view reference.
    #[must_use]
    pub const fn back_view_ref(&self) -> Option<&AssetRef> {
        self.back_view_ref.as_ref()
    }

    /// Returns the 3D model reference.
    #[must_use]
    pub const fn model_3d_ref(&self) -> Option<&AssetRef> {
        self.model_3d_ref.as_ref()
    }

    /// Returns the merchandise references.
    #[must_use]
    pub const fn merchandise_refs(&self) -> Option<&Value> {
        self.merchandise_refs.as_ref()
    }

    /// Returns the latest merchandise sub-job status.
    #[must_use]
    pub const fn merchandise_status(&self) -> Option<GenerationStatus> {
        self.merchandise_status
    }

    /// Returns the task that produced the character.
    #[must_use]
    pub const fn source_task_id(&self) -> Option<TaskId> {
        self.source_task_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a patch. Ownership and `created_at` are never affected.
    ///
    /// The merchandise status is stored as given; its progression belongs to
    /// the merchandise collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterDomainError::EmptyPatch`] when the patch changes
    /// nothing.
    pub fn apply(&mut self, patch: CharacterPatch) -> Result<(), CharacterDomainError> {
        if patch.is_empty() {
            return Err(CharacterDomainError::EmptyPatch);
        }
        let CharacterPatch {
            name,
            description,
            main_image_ref,
            left_view_ref,
            back_view_ref,
            model_3d_ref,
            merchandise_refs,
            merchandise_status,
        } = patch;

        if let Some(value) = name {
            self.name = value;
        }
        if let Some(value) = main_image_ref {
            self.main_image_ref = value;
        }
        replace_if_set(&mut self.description, description);
        replace_if_set(&mut self.left_view_ref, left_view_ref);
        replace_if_set(&mut self.back_view_ref, back_view_ref);
        replace_if_set(&mut self.model_3d_ref, model_3d_ref);
        replace_if_set(&mut self.merchandise_refs, merchandise_refs);
        replace_if_set(&mut self.merchandise_status, merchandise_status);
        Ok(())
    }
}

impl OwnedRecord for UserIpCharacter {
    const ENTITY: EntityType = EntityType::UserIpCharacter;

    fn owner(&self) -> Option<&UserId> {
        Some(&self.owner_id)
    }
}

fn replace_if_set<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}

fn validate_name(name: String) -> Result<String, CharacterDomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CharacterDomainError::EmptyName);
    }
    let actual = trimmed.chars().count();
    if actual > MAX_NAME_CHARS {
        return Err(CharacterDomainError::NameTooLong {
            max: MAX_NAME_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_owned())
}
