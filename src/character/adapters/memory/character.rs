//! In-memory repository for characters.

use crate::character::{
    domain::{CharacterId, CharacterPatch, UserIpCharacter},
    ports::{CharacterRepository, CharacterRepositoryError, CharacterRepositoryResult},
};
use crate::identity::domain::UserId;
use crate::page::{PageRequest, paginate};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory character repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCharacterRepository {
    characters: Arc<RwLock<HashMap<CharacterId, UserIpCharacter>>>,
}

impl InMemoryCharacterRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> CharacterRepositoryError {
    CharacterRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn store(&self, character: &UserIpCharacter) -> CharacterRepositoryResult<()> {
        let mut characters = self.characters.write().map_err(lock_error)?;
        if characters.contains_key(&character.id()) {
            return Err(CharacterRepositoryError::DuplicateCharacter(character.id()));
        }
        characters.insert(character.id(), character.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: CharacterId,
    ) -> CharacterRepositoryResult<Option<UserIpCharacter>> {
        let characters = self.characters.read().map_err(lock_error)?;
        Ok(characters.get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        page: PageRequest,
    ) -> CharacterRepositoryResult<Vec<UserIpCharacter>> {
        let characters = self.characters.read().map_err(lock_error)?;
        let mut owned: Vec<&UserIpCharacter> = characters
            .values()
            .filter(|character| character.owner_id() == owner)
            .collect();
        owned.sort_by_key(|character| Reverse((character.created_at(), character.id())));
        Ok(paginate(owned.into_iter().cloned(), page))
    }

    async fn apply_patch(
        &self,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> CharacterRepositoryResult<UserIpCharacter> {
        let mut characters = self.characters.write().map_err(lock_error)?;
        let stored = characters
            .get_mut(&id)
            .ok_or(CharacterRepositoryError::NotFound(id))?;
        stored.apply(patch)?;
        Ok(stored.clone())
    }

    async fn delete(&self, id: CharacterId) -> CharacterRepositoryResult<bool> {
        let mut characters = self.characters.write().map_err(lock_error)?;
        Ok(characters.remove(&id).is_some())
    }

    async fn delete_by_owner(&self, owner: &UserId) -> CharacterRepositoryResult<u64> {
        let mut characters = self.characters.write().map_err(lock_error)?;
        let before = characters.len();
        characters.retain(|_, character| character.owner_id() != owner);
        let removed = before.saturating_sub(characters.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
