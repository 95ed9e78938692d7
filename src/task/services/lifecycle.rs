//! Service layer for generation task creation, lookup and transitions.

use super::TimestampMaintainer;
use crate::access::{AccessControlEngine, AccessDenied, AssetRef, EntityType, Operation};
use crate::character::domain::CharacterId;
use crate::config::EngineConfig;
use crate::error::ErrorKind;
use crate::identity::domain::{IdentityContext, UserId};
use crate::identity::ports::{IdentityDirectory, IdentityDirectoryError};
use crate::page::{PageLimits, PageRequest};
use crate::task::{
    domain::{
        BatchId, GenerationStatus, GenerationTask, TaskDomainError, TaskId, TaskSubmission,
        TaskTransition,
    },
    ports::{GenerationTaskRepository, TaskRepositoryError},
};
use crate::timeout::{StorageTimeout, bounded};
use mockable::Clock;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Request payload for submitting a generation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    task_type: String,
    prompt: String,
    owner_id: Option<String>,
    input_image_ref: Option<String>,
    batch_id: Option<String>,
    parent_character_id: Option<CharacterId>,
}

impl CreateTaskRequest {
    /// Creates an anonymous request with the required fields.
    #[must_use]
    pub fn new(task_type: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            prompt: prompt.into(),
            owner_id: None,
            input_image_ref: None,
            batch_id: None,
            parent_character_id: None,
        }
    }

    /// Assigns the task to an owner.
    #[must_use]
    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Sets the input image reference.
    #[must_use]
    pub fn with_input_image(mut self, input_image_ref: impl Into<String>) -> Self {
        self.input_image_ref = Some(input_image_ref.into());
        self
    }

    /// Sets the batch grouping key.
    #[must_use]
    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Sets the character this task derives from.
    #[must_use]
    pub const fn with_parent_character(mut self, character_id: CharacterId) -> Self {
        self.parent_character_id = Some(character_id);
        self
    }

    fn into_submission(self) -> Result<TaskSubmission, TaskDomainError> {
        let Self {
            task_type,
            prompt,
            owner_id,
            input_image_ref,
            batch_id,
            parent_character_id,
        } = self;

        let owner = owner_id.map(UserId::new).transpose()?;
        let mut submission = TaskSubmission::new(owner, task_type, prompt)?;
        if let Some(raw) = input_image_ref {
            submission = submission.with_input_image(AssetRef::new(raw)?);
        }
        if let Some(raw) = batch_id {
            submission = submission.with_batch(BatchId::new(raw)?);
        }
        if let Some(character_id) = parent_character_id {
            submission = submission.with_parent_character(character_id);
        }
        Ok(submission)
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Input validation failed or the state machine rejected the edge.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The caller may not perform the write.
    #[error(transparent)]
    Unauthorized(#[from] AccessDenied),

    /// The task owner does not exist or is being removed.
    #[error("owner {0} is not an active identity")]
    InactiveOwner(UserId),

    /// No task visible to the caller has this identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A concurrent transition changed the task first.
    #[error("task {task_id} changed concurrently: expected {expected}, found {actual}")]
    Conflict {
        /// Task whose transition lost the race.
        task_id: TaskId,
        /// Status this request read.
        expected: GenerationStatus,
        /// Status now stored.
        actual: GenerationStatus,
    },

    /// The service stopped waiting for storage; the outcome is unknown.
    #[error(transparent)]
    Timeout(#[from] StorageTimeout),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// The identity directory could not be consulted.
    #[error(transparent)]
    Directory(#[from] IdentityDirectoryError),
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            TaskRepositoryError::Conflict {
                task_id,
                expected,
                actual,
            } => Self::Conflict {
                task_id,
                expected,
                actual,
            },
            other => Self::Repository(other),
        }
    }
}

impl TaskLifecycleError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => err.kind(),
            Self::Unauthorized(_) | Self::InactiveOwner(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Timeout(_) | Self::Repository(TaskRepositoryError::DeadlineExceeded) => {
                ErrorKind::Timeout
            }
            Self::Repository(_) | Self::Directory(_) => ErrorKind::Persistence,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Generation task lifecycle orchestration service.
///
/// Every operation authorizes the caller before any write reaches the
/// repository. Reads of tasks the caller may not see behave exactly like
/// reads of tasks that do not exist.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: GenerationTaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<dyn IdentityDirectory>,
    clock: Arc<C>,
    timestamps: TimestampMaintainer<C>,
    backstop: Duration,
    pages: PageLimits,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: GenerationTaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with default settings.
    ///
    /// `directory` decides which owners may still receive new tasks.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<dyn IdentityDirectory>, clock: Arc<C>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            repository,
            directory,
            timestamps: TimestampMaintainer::new(Arc::clone(&clock)),
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

    /// Submits a new task in `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid input,
    /// [`TaskLifecycleError::Unauthorized`] when the caller may not create a
    /// task for the requested owner, [`TaskLifecycleError::InactiveOwner`]
    /// when that owner is missing or being removed, or a storage error.
    #[instrument(skip(self, identity, request), fields(role = %identity.role()))]
    pub async fn create(
        &self,
        identity: &IdentityContext,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<GenerationTask> {
        let submission = request.into_submission()?;
        self.insert(identity, submission).await
    }

    /// Submits several tasks sharing `batch_id`.
    ///
    /// Each task is stored independently; on failure the tasks stored before
    /// it remain and can be found through [`Self::find_by_batch`].
    ///
    /// # Errors
    ///
    /// Returns the first error encountered, as for [`Self::create`].
    #[instrument(skip(self, identity, requests), fields(role = %identity.role(), count = requests.len()))]
    pub async fn create_batch(
        &self,
        identity: &IdentityContext,
        batch_id: &str,
        requests: Vec<CreateTaskRequest>,
    ) -> TaskLifecycleResult<Vec<GenerationTask>> {
        let batch = BatchId::new(batch_id)?;
        let submissions = requests
            .into_iter()
            .map(|request| {
                request
                    .into_submission()
                    .map(|submission| submission.with_batch(batch.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = Vec::with_capacity(submissions.len());
        for submission in submissions {
            created.push(self.insert(identity, submission).await?);
        }
        Ok(created)
    }

    /// Returns a task visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// or the caller may not read it.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn get(
        &self,
        identity: &IdentityContext,
        task_id: TaskId,
    ) -> TaskLifecycleResult<GenerationTask> {
        self.load_visible(identity, task_id).await
    }

    /// Returns every task in a batch that the caller may read, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a blank batch identifier or
    /// a storage error.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn find_by_batch(
        &self,
        identity: &IdentityContext,
        batch_id: &str,
    ) -> TaskLifecycleResult<Vec<GenerationTask>> {
        let batch = BatchId::new(batch_id)?;
        let siblings = self
            .bounded("find_by_batch", self.repository.find_by_batch(&batch))
            .await??;
        Ok(siblings
            .into_iter()
            .filter(|task| AccessControlEngine::can_read(identity, task))
            .collect())
    }

    /// Lists tasks of one owner, newest first. `None` lists anonymous tasks.
    ///
    /// A caller who may not read the owner's tasks receives an empty page.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    #[instrument(skip(self, identity), fields(role = %identity.role()))]
    pub async fn list_by_owner(
        &self,
        identity: &IdentityContext,
        owner: Option<&UserId>,
        page: PageRequest,
    ) -> TaskLifecycleResult<Vec<GenerationTask>> {
        let decision = AccessControlEngine::authorize(
            identity,
            Operation::Read,
            EntityType::GenerationTask,
            owner,
        );
        if !decision.is_allowed() {
            debug!("owner listing hidden from caller");
            return Ok(Vec::new());
        }
        let clamped = page.clamped(self.pages);
        Ok(self
            .bounded(
                "list_by_owner",
                self.repository.list_by_owner(owner.cloned(), clamped),
            )
            .await??)
    }

    /// Moves a `pending` task to `processing`.
    ///
    /// # Errors
    ///
    /// As for [`Self::transition`].
    pub async fn start_processing(
        &self,
        identity: &IdentityContext,
        task_id: TaskId,
    ) -> TaskLifecycleResult<GenerationTask> {
        self.transition(identity, task_id, TaskTransition::StartProcessing)
            .await
    }

    /// Moves a `processing` task to `completed` with its results.
    ///
    /// # Errors
    ///
    /// As for [`Self::transition`], plus [`TaskLifecycleError::Domain`] for a
    /// blank result image reference.
    pub async fn complete(
        &self,
        identity: &IdentityContext,
        task_id: TaskId,
        result_image_ref: Option<&str>,
        result_data: Option<Value>,
    ) -> TaskLifecycleResult<GenerationTask> {
        let image = result_image_ref
            .map(AssetRef::new)
            .transpose()
            .map_err(TaskDomainError::from)?;
        self.transition(identity, task_id, TaskTransition::complete(image, result_data))
            .await
    }

    /// Moves a `processing` task to `failed`.
    ///
    /// # Errors
    ///
    /// As for [`Self::transition`], plus [`TaskLifecycleError::Domain`] for a
    /// blank message.
    pub async fn fail(
        &self,
        identity: &IdentityContext,
        task_id: TaskId,
        error_message: &str,
    ) -> TaskLifecycleResult<GenerationTask> {
        let transition = TaskTransition::fail(error_message)?;
        self.transition(identity, task_id, transition).await
    }

    /// Applies a state machine transition atomically.
    ///
    /// The current state is read, authorized, validated against the state
    /// machine, stamped, and written back only if the stored status is still
    /// the one that was read.
    ///
    /// # Errors
    ///
    /// - [`TaskLifecycleError::NotFound`] when the caller cannot see the task.
    /// - [`TaskLifecycleError::Unauthorized`] when the caller may read but not
    ///   update it.
    /// - [`TaskLifecycleError::Domain`] with
    ///   [`TaskDomainError::InvalidTransition`] for an edge outside
    ///   `pending -> processing -> {completed, failed}`.
    /// - [`TaskLifecycleError::Conflict`] when a concurrent transition won.
    /// - [`TaskLifecycleError::Timeout`] when storage did not answer in time.
    #[instrument(
        skip(self, identity, transition),
        fields(role = %identity.role(), target = %transition.target())
    )]
    pub async fn transition(
        &self,
        identity: &IdentityContext,
        task_id: TaskId,
        transition: TaskTransition,
    ) -> TaskLifecycleResult<GenerationTask> {
        let mut task = self.load_visible(identity, task_id).await?;
        AccessControlEngine::require(
            identity,
            Operation::Update,
            EntityType::GenerationTask,
            task.owner_id(),
        )?;

        let previous = task.status();
        if let Err(err) = task.apply(transition) {
            debug!(%err, "transition rejected by state machine");
            return Err(err.into());
        }
        self.timestamps.stamp(&mut task);

        let written = self
            .bounded(
                "update_if_status",
                self.repository.update_if_status(&task, previous),
            )
            .await?;
        if let Err(err) = written {
            warn!(%err, "task transition not persisted");
            return Err(err.into());
        }

        debug!(from = %previous, to = %task.status(), "task transitioned");
        Ok(task)
    }

    async fn insert(
        &self,
        identity: &IdentityContext,
        submission: TaskSubmission,
    ) -> TaskLifecycleResult<GenerationTask> {
        if let Err(denied) = AccessControlEngine::require(
            identity,
            Operation::Insert,
            EntityType::GenerationTask,
            submission.owner_id(),
        ) {
            warn!(%denied, "task insert denied");
            return Err(denied.into());
        }

        let owner = submission.owner_id().cloned();
        if let Some(owner) = &owner {
            self.require_active(owner).await?;
        }
        let task = GenerationTask::submit(submission, &*self.clock);
        self.bounded("store", self.repository.store(&task)).await??;
        if let Some(owner) = &owner {
            // A removal flagged since the first check may already have swept
            // the owner's tasks, so they are swept again.
            if let Err(err) = self.require_active(owner).await {
                if matches!(err, TaskLifecycleError::InactiveOwner(_)) {
                    self.bounded("delete_by_owner", self.repository.delete_by_owner(owner))
                        .await??;
                }
                return Err(err);
            }
        }
        debug!(task_id = %task.id(), anonymous = task.owner_id().is_none(), "task created");
        Ok(task)
    }

    async fn require_active(&self, owner: &UserId) -> TaskLifecycleResult<()> {
        if self
            .bounded("is_active", self.directory.is_active(owner))
            .await??
        {
            Ok(())
        } else {
            warn!(%owner, "task insert for inactive owner");
            Err(TaskLifecycleError::InactiveOwner(owner.clone()))
        }
    }

    async fn load_visible(
        &self,
        identity: &IdentityContext,
        task_id: TaskId,
    ) -> TaskLifecycleResult<GenerationTask> {
        let found = self
            .bounded("find_by_id", self.repository.find_by_id(task_id))
            .await??;
        match found {
            Some(task) if AccessControlEngine::can_read(identity, &task) => Ok(task),
            Some(_) => {
                debug!(%task_id, "task hidden from caller");
                Err(TaskLifecycleError::NotFound(task_id))
            }
            None => Err(TaskLifecycleError::NotFound(task_id)),
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
