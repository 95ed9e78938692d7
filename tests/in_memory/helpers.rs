//! Shared test helpers for in-memory integration tests.

use ipforge::character::{
    adapters::memory::InMemoryCharacterRepository, services::CharacterRegistryService,
};
use ipforge::identity::{
    adapters::memory::InMemoryIdentityDirectory,
    domain::{IdentityContext, IdentityRecord, UserId},
    ports::IdentityDirectory,
    services::{AccountRemovalService, ProfileViewService},
};
use ipforge::task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// All services wired over one set of in-memory stores.
pub struct Engine {
    pub tasks: TaskLifecycleService<InMemoryTaskRepository, DefaultClock>,
    pub characters: CharacterRegistryService<InMemoryCharacterRepository, DefaultClock>,
    pub profiles: ProfileViewService<InMemoryIdentityDirectory>,
    pub removal: AccountRemovalService<
        InMemoryTaskRepository,
        InMemoryCharacterRepository,
        InMemoryIdentityDirectory,
    >,
    pub directory: Arc<InMemoryIdentityDirectory>,
}

/// Accounts every engine starts with.
pub const ACCOUNTS: [&str; 4] = ["u1", "u2", "u7", "u9"];

/// Provides a fresh engine for each test, with [`ACCOUNTS`] registered.
#[fixture]
pub fn engine() -> Engine {
    let clock = Arc::new(DefaultClock);
    let task_store = Arc::new(InMemoryTaskRepository::new());
    let character_store = Arc::new(InMemoryCharacterRepository::new());
    let records = ACCOUNTS
        .iter()
        .filter_map(|id| UserId::new(*id).ok())
        .map(|id| IdentityRecord::new(id, chrono::Utc::now()));
    let directory = Arc::new(InMemoryIdentityDirectory::with_records(records));

    Engine {
        tasks: TaskLifecycleService::new(
            Arc::clone(&task_store),
            Arc::clone(&directory) as Arc<dyn IdentityDirectory>,
            Arc::clone(&clock),
        ),
        characters: CharacterRegistryService::new(
            Arc::clone(&character_store),
            Arc::clone(&directory) as Arc<dyn IdentityDirectory>,
            clock,
        ),
        profiles: ProfileViewService::new(Arc::clone(&directory)),
        removal: AccountRemovalService::new(task_store, character_store, Arc::clone(&directory)),
        directory,
    }
}

/// Builds a standard-role identity for `id`.
///
/// # Errors
///
/// Returns an error when `id` is not a valid user identifier.
pub fn user(id: &str) -> eyre::Result<IdentityContext> {
    Ok(IdentityContext::user(UserId::new(id)?))
}
