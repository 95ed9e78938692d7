//! In-memory identity directory for tests and embedded use.

use crate::identity::{
    domain::{IdentityRecord, UserId},
    ports::{IdentityDirectory, IdentityDirectoryError, IdentityDirectoryResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct DirectoryState {
    records: HashMap<UserId, IdentityRecord>,
    removing: HashSet<UserId>,
}

/// Thread-safe in-memory identity directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryIdentityDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory that already holds `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let state = DirectoryState {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
            removing: HashSet::new(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

fn lock_error(err: impl ToString) -> IdentityDirectoryError {
    IdentityDirectoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn upsert(&self, record: &IdentityRecord) -> IdentityDirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> IdentityDirectoryResult<Option<IdentityRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.records.get(id).cloned())
    }

    async fn begin_removal(&self, id: &UserId) -> IdentityDirectoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.records.contains_key(id) {
            return Ok(false);
        }
        state.removing.insert(id.clone());
        Ok(true)
    }

    async fn is_active(&self, id: &UserId) -> IdentityDirectoryResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.records.contains_key(id) && !state.removing.contains(id))
    }

    async fn remove(&self, id: &UserId) -> IdentityDirectoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.removing.remove(id);
        Ok(state.records.remove(id).is_some())
    }
}
