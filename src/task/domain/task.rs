//! Generation task aggregate and the values used to create and advance it.

use super::{BatchId, GenerationStatus, TaskDomainError, TaskId};
use crate::access::{AssetRef, EntityType, OwnedRecord};
use crate::character::domain::CharacterId;
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest task type the `generation_tasks.task_type` column holds.
pub const MAX_TASK_TYPE_CHARS: usize = 100;

/// Validated input for a new generation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    owner_id: Option<UserId>,
    task_type: String,
    prompt: String,
    input_image_ref: Option<AssetRef>,
    batch_id: Option<BatchId>,
    parent_character_id: Option<CharacterId>,
}

impl TaskSubmission {
    /// Creates a submission with the required fields.
    ///
    /// A `None` owner submits an anonymous task that every caller may read
    /// and update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskType`] or
    /// [`TaskDomainError::EmptyPrompt`] when either is blank, and
    /// [`TaskDomainError::TaskTypeTooLong`] for a task type longer than
    /// [`MAX_TASK_TYPE_CHARS`].
    pub fn new(
        owner_id: Option<UserId>,
        task_type: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        let task_type = non_blank(task_type.into(), TaskDomainError::EmptyTaskType)?;
        let actual = task_type.chars().count();
        if actual > MAX_TASK_TYPE_CHARS {
            return Err(TaskDomainError::TaskTypeTooLong {
                max: MAX_TASK_TYPE_CHARS,
                actual,
            });
        }
        Ok(Self {
            owner_id,
            task_type,
            prompt: non_blank(prompt.into(), TaskDomainError::EmptyPrompt)?,
            input_image_ref: None,
            batch_id: None,
            parent_character_id: None,
        })
    }

    /// Sets the input image.
    #[must_use]
    pub fn with_input_image(mut self, input_image_ref: AssetRef) -> Self {
        self.input_image_ref = Some(input_image_ref);
        self
    }

    /// Groups the task with its batch siblings.
    #[must_use]
    pub fn with_batch(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Marks the task as deriving from an existing character.
    #[must_use]
    pub const fn with_parent_character(mut self, character_id: CharacterId) -> Self {
        self.parent_character_id = Some(character_id);
        self
    }

    /// Returns the requested owner.
    #[must_use]
    pub const fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }
}

impl OwnedRecord for TaskSubmission {
    const ENTITY: EntityType = EntityType::GenerationTask;

    fn owner(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }
}

/// A requested edge of the task state machine, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskTransition {
    /// `pending -> processing`.
    StartProcessing,
    /// `processing -> completed`.
    Complete {
        /// Reference to the generated image.
        result_image_ref: Option<AssetRef>,
        /// Producer-defined structured result.
        result_data: Option<Value>,
    },
    /// `processing -> failed`.
    Fail {
        /// Reason reported by the worker.
        error_message: String,
    },
}

impl TaskTransition {
    /// Builds a completion transition.
    #[must_use]
    pub const fn complete(result_image_ref: Option<AssetRef>, result_data: Option<Value>) -> Self {
        Self::Complete {
            result_image_ref,
            result_data,
        }
    }

    /// Builds a failure transition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyErrorMessage`] for a blank message.
    pub fn fail(error_message: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self::Fail {
            error_message: non_blank(error_message.into(), TaskDomainError::EmptyErrorMessage)?,
        })
    }

    /// Returns the status this transition leads to.
    #[must_use]
    pub const fn target(&self) -> GenerationStatus {
        match self {
            Self::StartProcessing => GenerationStatus::Processing,
            Self::Complete { .. } => GenerationStatus::Completed,
            Self::Fail { .. } => GenerationStatus::Failed,
        }
    }
}

/// Generation task aggregate root.
///
/// Result fields are only populated by a completion and the error message
/// only by a failure, so they are meaningful exactly in those states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationTask {
    id: TaskId,
    owner_id: Option<UserId>,
    status: GenerationStatus,
    task_type: String,
    prompt: String,
    input_image_ref: Option<AssetRef>,
    result_image_ref: Option<AssetRef>,
    result_data: Option<Value>,
    error_message: Option<String>,
    batch_id: Option<BatchId>,
    parent_character_id: Option<CharacterId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Task identifier.
    pub id: TaskId,
    /// Owner, or `None` for anonymous tasks.
    pub owner_id: Option<UserId>,
    /// Lifecycle status.
    pub status: GenerationStatus,
    /// Classification string.
    pub task_type: String,
    /// Prompt text.
    pub prompt: String,
    /// Input image reference.
    pub input_image_ref: Option<AssetRef>,
    /// Result image reference.
    pub result_image_ref: Option<AssetRef>,
    /// Structured result payload.
    pub result_data: Option<Value>,
    /// Failure message.
    pub error_message: Option<String>,
    /// Batch grouping key.
    pub batch_id: Option<BatchId>,
    /// Character this task derives from.
    pub parent_character_id: Option<CharacterId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl GenerationTask {
    /// Creates a `pending` task from a validated submission.
    #[must_use]
    pub fn submit(submission: TaskSubmission, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let TaskSubmission {
            owner_id,
            task_type,
            prompt,
            input_image_ref,
            batch_id,
            parent_character_id,
        } = submission;

        Self {
            id: TaskId::new(),
            owner_id,
            status: GenerationStatus::Pending,
            task_type,
            prompt,
            input_image_ref,
            result_image_ref: None,
            result_data: None,
            error_message: None,
            batch_id,
            parent_character_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            status: data.status,
            task_type: data.task_type,
            prompt: data.prompt,
            input_image_ref: data.input_image_ref,
            result_image_ref: data.result_image_ref,
            result_data: data.result_data,
            error_message: data.error_message,
            batch_id: data.batch_id,
            parent_character_id: data.parent_character_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owner, or `None` for an anonymous task.
    #[must_use]
    pub const fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> GenerationStatus {
        self.status
    }

    /// Returns the classification string.
    #[must_use]
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Returns the prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the input image reference.
    #[must_use]
    pub const fn input_image_ref(&self) -> Option<&AssetRef> {
        self.input_image_ref.as_ref()
    }

    /// Returns the result image reference, set only once completed.
    #[must_use]
    pub const fn result_image_ref(&self) -> Option<&AssetRef> {
        self.result_image_ref.as_ref()
    }

    /// Returns the structured result, set only once completed.
    #[must_use]
    pub const fn result_data(&self) -> Option<&Value> {
        self.result_data.as_ref()
    }

    /// Returns the failure message, set only once failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the batch grouping key.
    #[must_use]
    pub const fn batch_id(&self) -> Option<&BatchId> {
        self.batch_id.as_ref()
    }

    /// Returns the character this task derives from.
    #[must_use]
    pub const fn parent_character_id(&self) -> Option<CharacterId> {
        self.parent_character_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a state machine transition and its payload.
    ///
    /// Does not touch `updated_at`; the lifecycle service stamps the task
    /// after validation and before the write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the current status
    /// does not lead to the transition's target. The task is left unchanged.
    pub fn apply(&mut self, transition: TaskTransition) -> Result<(), TaskDomainError> {
        let target = transition.target();
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }

        match transition {
            TaskTransition::StartProcessing => {}
            TaskTransition::Complete {
                result_image_ref,
                result_data,
            } => {
                self.result_image_ref = result_image_ref;
                self.result_data = result_data;
            }
            TaskTransition::Fail { error_message } => {
                self.error_message = Some(error_message);
            }
        }
        self.status = target;
        Ok(())
    }

    /// Moves `updated_at` forward to `at`.
    ///
    /// A clock that steps backwards never makes `updated_at` decrease.
    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(at);
    }
}

impl OwnedRecord for GenerationTask {
    const ENTITY: EntityType = EntityType::GenerationTask;

    fn owner(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }
}

fn non_blank(value: String, error: TaskDomainError) -> Result<String, TaskDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_owned())
}
