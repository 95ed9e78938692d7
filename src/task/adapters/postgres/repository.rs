//! `PostgreSQL` repository implementation for generation task storage.

use super::{
    models::{NewTaskRow, TaskRow, TaskTransitionChangeset},
    schema::generation_tasks,
};
use crate::access::AssetRef;
use crate::character::domain::CharacterId;
use crate::config::EngineConfig;
use crate::identity::domain::UserId;
use crate::page::PageRequest;
use crate::postgres::{GuardedError, PgPool, is_statement_timeout, run_with_deadline};
use crate::task::{
    domain::{BatchId, GenerationStatus, GenerationTask, PersistedTaskData, TaskId},
    ports::{GenerationTaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::Duration;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = PgPool;

/// `PostgreSQL`-backed generation task repository.
///
/// Every call runs in its own transaction bounded by the configured storage
/// deadline; an overrunning call is rolled back by the server and reported
/// as [`TaskRepositoryError::DeadlineExceeded`].
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
    deadline: Duration,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: TaskPgPool) -> Self {
        Self {
            pool,
            deadline: EngineConfig::default().storage_timeout(),
        }
    }

    /// Applies the storage deadline from `config`.
    #[must_use]
    pub const fn with_config(mut self, config: &EngineConfig) -> Self {
        self.deadline = config.storage_timeout();
        self
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let deadline = self.deadline;
        tokio::task::spawn_blocking(move || {
            run_with_deadline(&pool, deadline, f).map_err(from_guarded)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

fn from_guarded(err: GuardedError<TaskRepositoryError>) -> TaskRepositoryError {
    match err {
        GuardedError::Expired => TaskRepositoryError::DeadlineExceeded,
        GuardedError::Database(err) => database_error(err),
        GuardedError::Work(err) => err,
    }
}

fn database_error(err: DieselError) -> TaskRepositoryError {
    if is_statement_timeout(&err) {
        TaskRepositoryError::DeadlineExceeded
    } else {
        TaskRepositoryError::persistence(err)
    }
}

#[async_trait]
impl GenerationTaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &GenerationTask) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(generation_tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => database_error(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<GenerationTask>> {
        self.run_blocking(move |connection| {
            let row = generation_tasks::table
                .filter(generation_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(database_error)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_batch(
        &self,
        batch_id: &BatchId,
    ) -> TaskRepositoryResult<Vec<GenerationTask>> {
        let batch = batch_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = generation_tasks::table
                .filter(generation_tasks::batch_id.eq(batch))
                .order((generation_tasks::created_at.asc(), generation_tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(database_error)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_by_owner(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Vec<GenerationTask>> {
        let limit = i64::try_from(page.limit).map_err(TaskRepositoryError::persistence)?;
        let offset = i64::try_from(page.offset).map_err(TaskRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let mut query = generation_tasks::table
                .select(TaskRow::as_select())
                .order((generation_tasks::created_at.desc(), generation_tasks::id.desc()))
                .limit(limit)
                .offset(offset)
                .into_boxed();
            query = match owner {
                Some(user) => query.filter(generation_tasks::user_id.eq(String::from(user))),
                None => query.filter(generation_tasks::user_id.is_null()),
            };
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(database_error)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update_if_status(
        &self,
        task: &GenerationTask,
        expected: GenerationStatus,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changes = to_changeset(task);

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                generation_tasks::table
                    .filter(generation_tasks::id.eq(task_id.into_inner()))
                    .filter(generation_tasks::status.eq(expected.as_str())),
            )
            .set(&changes)
            .execute(connection)
            .map_err(database_error)?;

            if affected == 1 {
                return Ok(());
            }

            let current = generation_tasks::table
                .filter(generation_tasks::id.eq(task_id.into_inner()))
                .select(generation_tasks::status)
                .first::<String>(connection)
                .optional()
                .map_err(database_error)?;

            match current {
                None => Err(TaskRepositoryError::NotFound(task_id)),
                Some(status) => Err(TaskRepositoryError::Conflict {
                    task_id,
                    expected,
                    actual: GenerationStatus::try_from(status.as_str())
                        .map_err(TaskRepositoryError::persistence)?,
                }),
            }
        })
        .await
    }

    async fn delete_by_owner(&self, owner: &UserId) -> TaskRepositoryResult<u64> {
        let user = owner.as_str().to_owned();
        self.run_blocking(move |connection| {
            let removed =
                diesel::delete(generation_tasks::table.filter(generation_tasks::user_id.eq(user)))
                    .execute(connection)
                    .map_err(database_error)?;
            u64::try_from(removed).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

fn to_new_row(task: &GenerationTask) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        user_id: task.owner_id().map(|owner| owner.as_str().to_owned()),
        status: task.status().as_str().to_owned(),
        task_type: task.task_type().to_owned(),
        prompt: task.prompt().to_owned(),
        input_image_url: task.input_image_ref().map(|asset| asset.as_str().to_owned()),
        result_image_url: task.result_image_ref().map(|asset| asset.as_str().to_owned()),
        result_data: task.result_data().cloned(),
        error_message: task.error_message().map(ToOwned::to_owned),
        batch_id: task.batch_id().map(|batch| batch.as_str().to_owned()),
        parent_character_id: task.parent_character_id().map(CharacterId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_changeset(task: &GenerationTask) -> TaskTransitionChangeset {
    TaskTransitionChangeset {
        status: task.status().as_str().to_owned(),
        result_image_url: task.result_image_ref().map(|asset| asset.as_str().to_owned()),
        result_data: task.result_data().cloned(),
        error_message: task.error_message().map(ToOwned::to_owned),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<GenerationTask> {
    let TaskRow {
        id,
        user_id,
        status,
        task_type,
        prompt,
        input_image_url,
        result_image_url,
        result_data,
        error_message,
        batch_id,
        parent_character_id,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner_id: user_id
            .map(UserId::new)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        status: GenerationStatus::try_from(status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        task_type,
        prompt,
        input_image_ref: parse_asset(input_image_url)?,
        result_image_ref: parse_asset(result_image_url)?,
        result_data,
        error_message,
        batch_id: batch_id
            .map(BatchId::new)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        parent_character_id: parent_character_id.map(CharacterId::from_uuid),
        created_at,
        updated_at,
    };
    Ok(GenerationTask::from_persisted(data))
}

fn parse_asset(value: Option<String>) -> TaskRepositoryResult<Option<AssetRef>> {
    value
        .map(AssetRef::new)
        .transpose()
        .map_err(TaskRepositoryError::persistence)
}
