//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use ipforge::identity::adapters::memory::InMemoryIdentityDirectory;
use ipforge::identity::domain::{IdentityContext, IdentityRecord, UserId};
use ipforge::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::GenerationTask,
    services::{TaskLifecycleError, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    pub service: TestTaskService,
    pub current_task: Option<GenerationTask>,
    pub last_result: Option<Result<GenerationTask, TaskLifecycleError>>,
    pub batch_result: Option<Vec<GenerationTask>>,
}

impl TaskLifecycleWorld {
    /// Creates a world with an empty repository and the scenario accounts
    /// registered.
    #[must_use]
    pub fn new() -> Self {
        let accounts = ["u1", "u2", "u9"]
            .into_iter()
            .filter_map(|id| UserId::new(id).ok())
            .map(|id| IdentityRecord::new(id, chrono::Utc::now()));
        Self {
            service: TaskLifecycleService::new(
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(InMemoryIdentityDirectory::with_records(accounts)),
                Arc::new(DefaultClock),
            ),
            current_task: None,
            last_result: None,
            batch_result: None,
        }
    }

    /// Returns the task the scenario is working on.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been submitted yet.
    pub fn task(&self) -> Result<&GenerationTask, eyre::Report> {
        self.current_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Builds a standard-role identity.
///
/// # Errors
///
/// Returns an error for an invalid user identifier.
pub fn user(id: &str) -> Result<IdentityContext, eyre::Report> {
    Ok(IdentityContext::user(UserId::new(id)?))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
