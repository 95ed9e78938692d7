//! In-memory repository for generation tasks.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::domain::UserId;
use crate::page::{PageRequest, paginate};
use crate::task::{
    domain::{BatchId, GenerationStatus, GenerationTask, TaskId},
    ports::{GenerationTaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// A single lock guards all state, which makes the status compare-and-set in
/// [`GenerationTaskRepository::update_if_status`] atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, GenerationTask>,
    batch_index: HashMap<BatchId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Removes a task ID from the batch index, dropping the entry if empty.
fn unindex_batch(index: &mut HashMap<BatchId, Vec<TaskId>>, batch_id: &BatchId, task_id: TaskId) {
    if let Some(ids) = index.get_mut(batch_id) {
        ids.retain(|id| *id != task_id);
        if ids.is_empty() {
            index.remove(batch_id);
        }
    }
}

#[async_trait]
impl GenerationTaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &GenerationTask) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if let Some(batch_id) = task.batch_id() {
            state
                .batch_index
                .entry(batch_id.clone())
                .or_default()
                .push(task.id());
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<GenerationTask>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_batch(
        &self,
        batch_id: &BatchId,
    ) -> TaskRepositoryResult<Vec<GenerationTask>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut siblings: Vec<GenerationTask> = state
            .batch_index
            .get(batch_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        siblings.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(siblings)
    }

    async fn list_by_owner(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Vec<GenerationTask>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut owned: Vec<&GenerationTask> = state
            .tasks
            .values()
            .filter(|task| task.owner_id() == owner.as_ref())
            .collect();
        owned.sort_by_key(|task| Reverse((task.created_at(), task.id())));
        Ok(paginate(owned.into_iter().cloned(), page))
    }

    async fn update_if_status(
        &self,
        task: &GenerationTask,
        expected: GenerationStatus,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        if stored.status() != expected {
            return Err(TaskRepositoryError::Conflict {
                task_id: task.id(),
                expected,
                actual: stored.status(),
            });
        }

        stored.clone_from(task);
        Ok(())
    }

    async fn delete_by_owner(&self, owner: &UserId) -> TaskRepositoryResult<u64> {
        let mut state = self.state.write().map_err(lock_error)?;
        let doomed: Vec<(TaskId, Option<BatchId>)> = state
            .tasks
            .values()
            .filter(|task| task.owner_id() == Some(owner))
            .map(|task| (task.id(), task.batch_id().cloned()))
            .collect();

        for (task_id, batch_id) in &doomed {
            state.tasks.remove(task_id);
            if let Some(batch) = batch_id {
                unindex_batch(&mut state.batch_index, batch, *task_id);
            }
        }
        Ok(u64::try_from(doomed.len()).unwrap_or(u64::MAX))
    }
}
