//! Repository port for generation task persistence and lookup.

use crate::identity::domain::UserId;
use crate::page::PageRequest;
use crate::task::domain::{BatchId, GenerationStatus, GenerationTask, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Generation task persistence contract.
///
/// Implementations never evaluate authorization; callers filter results.
#[async_trait]
pub trait GenerationTaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the ID exists.
    async fn store(&self, task: &GenerationTask) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<GenerationTask>>;

    /// Returns every task sharing `batch_id`, oldest first.
    async fn find_by_batch(&self, batch_id: &BatchId)
    -> TaskRepositoryResult<Vec<GenerationTask>>;

    /// Returns one page of the tasks owned by `owner` (`None` lists
    /// anonymous tasks), newest first with the task ID descending as
    /// tie-breaker.
    async fn list_by_owner(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Vec<GenerationTask>>;

    /// Replaces the mutable fields of `task` if, and only if, the stored
    /// status still equals `expected`.
    ///
    /// The check and the write happen atomically. `created_at` is never
    /// rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::Conflict`] when another writer changed the
    /// status first.
    async fn update_if_status(
        &self,
        task: &GenerationTask,
        expected: GenerationStatus,
    ) -> TaskRepositoryResult<()>;

    /// Deletes every task owned by `owner` and returns how many were removed.
    async fn delete_by_owner(&self, owner: &UserId) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored status no longer matches the expected one.
    #[error("task {task_id} was expected in {expected} but is {actual}")]
    Conflict {
        /// Task whose write lost the race.
        task_id: TaskId,
        /// Status the writer read.
        expected: GenerationStatus,
        /// Status currently stored.
        actual: GenerationStatus,
    },

    /// The database cancelled the call at the storage deadline and rolled
    /// it back.
    #[error("storage deadline exceeded")]
    DeadlineExceeded,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
