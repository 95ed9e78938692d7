//! `PostgreSQL` repository implementation for character storage.

use super::{
    models::{CharacterPatchChangeset, CharacterRow},
    schema::user_ip_characters,
};
use crate::access::AssetRef;
use crate::character::{
    domain::{
        CharacterDomainError, CharacterId, CharacterPatch, PersistedCharacterData,
        UserIpCharacter,
    },
    ports::{CharacterRepository, CharacterRepositoryError, CharacterRepositoryResult},
};
use crate::config::EngineConfig;
use crate::identity::domain::UserId;
use crate::page::PageRequest;
use crate::postgres::{GuardedError, PgPool, is_statement_timeout, run_with_deadline};
use crate::task::domain::{GenerationStatus, TaskId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::Duration;

/// `PostgreSQL` connection pool type used by character adapters.
pub type CharacterPgPool = PgPool;

/// `PostgreSQL`-backed character repository.
///
/// Calls are bounded by the storage deadline in the same way as the task
/// repository.
#[derive(Debug, Clone)]
pub struct PostgresCharacterRepository {
    pool: CharacterPgPool,
    deadline: Duration,
}

impl PostgresCharacterRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: CharacterPgPool) -> Self {
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

    async fn run_blocking<F, T>(&self, f: F) -> CharacterRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CharacterRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let deadline = self.deadline;
        tokio::task::spawn_blocking(move || {
            run_with_deadline(&pool, deadline, f).map_err(from_guarded)
        })
        .await
        .map_err(CharacterRepositoryError::persistence)?
    }
}

fn from_guarded(err: GuardedError<CharacterRepositoryError>) -> CharacterRepositoryError {
    match err {
        GuardedError::Expired => CharacterRepositoryError::DeadlineExceeded,
        GuardedError::Database(err) => database_error(err),
        GuardedError::Work(err) => err,
    }
}

fn database_error(err: DieselError) -> CharacterRepositoryError {
    if is_statement_timeout(&err) {
        CharacterRepositoryError::DeadlineExceeded
    } else {
        CharacterRepositoryError::persistence(err)
    }
}

#[async_trait]
impl CharacterRepository for PostgresCharacterRepository {
    async fn store(&self, character: &UserIpCharacter) -> CharacterRepositoryResult<()> {
        let character_id = character.id();
        let row = to_row(character);
        self.run_blocking(move |connection| {
            diesel::insert_into(user_ip_characters::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CharacterRepositoryError::DuplicateCharacter(character_id)
                    }
                    _ => database_error(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: CharacterId,
    ) -> CharacterRepositoryResult<Option<UserIpCharacter>> {
        self.run_blocking(move |connection| {
            let row = user_ip_characters::table
                .filter(user_ip_characters::id.eq(id.into_inner()))
                .select(CharacterRow::as_select())
                .first::<CharacterRow>(connection)
                .optional()
                .map_err(database_error)?;
            row.map(row_to_character).transpose()
        })
        .await
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        page: PageRequest,
    ) -> CharacterRepositoryResult<Vec<UserIpCharacter>> {
        let user = owner.as_str().to_owned();
        let limit = i64::try_from(page.limit).map_err(CharacterRepositoryError::persistence)?;
        let offset = i64::try_from(page.offset).map_err(CharacterRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = user_ip_characters::table
                .filter(user_ip_characters::user_id.eq(user))
                .order((
                    user_ip_characters::created_at.desc(),
                    user_ip_characters::id.desc(),
                ))
                .limit(limit)
                .offset(offset)
                .select(CharacterRow::as_select())
                .load::<CharacterRow>(connection)
                .map_err(database_error)?;
            rows.into_iter().map(row_to_character).collect()
        })
        .await
    }

    async fn apply_patch(
        &self,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> CharacterRepositoryResult<UserIpCharacter> {
        if patch.is_empty() {
            return Err(CharacterDomainError::EmptyPatch.into());
        }
        let changes = to_patch_changeset(&patch);
        self.run_blocking(move |connection| {
            let row = diesel::update(
                user_ip_characters::table.filter(user_ip_characters::id.eq(id.into_inner())),
            )
            .set(&changes)
            .returning(CharacterRow::as_returning())
            .get_result::<CharacterRow>(connection)
            .optional()
            .map_err(database_error)?;
            match row {
                Some(row) => row_to_character(row),
                None => Err(CharacterRepositoryError::NotFound(id)),
            }
        })
        .await
    }

    async fn delete(&self, id: CharacterId) -> CharacterRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                user_ip_characters::table.filter(user_ip_characters::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(database_error)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn delete_by_owner(&self, owner: &UserId) -> CharacterRepositoryResult<u64> {
        let user = owner.as_str().to_owned();
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                user_ip_characters::table.filter(user_ip_characters::user_id.eq(user)),
            )
            .execute(connection)
            .map_err(database_error)?;
            u64::try_from(removed).map_err(CharacterRepositoryError::persistence)
        })
        .await
    }
}

fn asset_string(asset: Option<&AssetRef>) -> Option<String> {
    asset.map(|value| value.as_str().to_owned())
}

fn to_row(character: &UserIpCharacter) -> CharacterRow {
    CharacterRow {
        id: character.id().into_inner(),
        user_id: character.owner_id().as_str().to_owned(),
        name: character.name().to_owned(),
        description: character.description().map(ToOwned::to_owned),
        main_image_url: character.main_image_ref().as_str().to_owned(),
        left_view_url: asset_string(character.left_view_ref()),
        back_view_url: asset_string(character.back_view_ref()),
        model_3d_url: asset_string(character.model_3d_ref()),
        merchandise_urls: character.merchandise_refs().cloned(),
        merchandise_task_status: character
            .merchandise_status()
            .map(|status| status.as_str().to_owned()),
        source_task_id: character.source_task_id().map(TaskId::into_inner),
        created_at: character.created_at(),
    }
}

fn to_patch_changeset(patch: &CharacterPatch) -> CharacterPatchChangeset {
    CharacterPatchChangeset {
        name: patch.name().map(ToOwned::to_owned),
        description: patch.description().map(ToOwned::to_owned),
        main_image_url: asset_string(patch.main_image_ref()),
        left_view_url: asset_string(patch.left_view_ref()),
        back_view_url: asset_string(patch.back_view_ref()),
        model_3d_url: asset_string(patch.model_3d_ref()),
        merchandise_urls: patch.merchandise_refs().cloned(),
        merchandise_task_status: patch
            .merchandise_status()
            .map(|status| status.as_str().to_owned()),
    }
}

fn parse_asset(value: Option<String>) -> CharacterRepositoryResult<Option<AssetRef>> {
    value
        .map(AssetRef::new)
        .transpose()
        .map_err(CharacterRepositoryError::persistence)
}

fn row_to_character(row: CharacterRow) -> CharacterRepositoryResult<UserIpCharacter> {
    let CharacterRow {
        id,
        user_id,
        name,
        description,
        main_image_url,
        left_view_url,
        back_view_url,
        model_3d_url,
        merchandise_urls,
        merchandise_task_status,
        source_task_id,
        created_at,
    } = row;

    let data = PersistedCharacterData {
        id: CharacterId::from_uuid(id),
        owner_id: UserId::new(user_id).map_err(CharacterRepositoryError::persistence)?,
        name,
        description,
        main_image_ref: AssetRef::new(main_image_url)
            .map_err(CharacterRepositoryError::persistence)?,
        left_view_ref: parse_asset(left_view_url)?,
        back_view_ref: parse_asset(back_view_url)?,
        model_3d_ref: parse_asset(model_3d_url)?,
        merchandise_refs: merchandise_urls,
        merchandise_status: merchandise_task_status
            .as_deref()
            .map(GenerationStatus::try_from)
            .transpose()
            .map_err(CharacterRepositoryError::persistence)?,
        source_task_id: source_task_id.map(TaskId::from_uuid),
        created_at,
    };
    Ok(UserIpCharacter::from_persisted(data))
}

#[cfg(test)]
mod tests {
    use super::{database_error, row_to_character, to_patch_changeset, to_row};
    use crate::access::AssetRef;
    use crate::character::domain::{CharacterDraft, CharacterPatch, UserIpCharacter};
    use crate::character::ports::CharacterRepositoryError;
    use crate::identity::domain::UserId;
    use crate::task::domain::{GenerationStatus, TaskId};
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn enriched() -> UserIpCharacter {
        let draft = CharacterDraft::new(
            UserId::new("u1").expect("valid user id"),
            "Kitsune",
            "u1/k.png",
        )
        .expect("valid draft")
        .with_source_task(TaskId::new());
        let mut character = UserIpCharacter::create(draft, &DefaultClock);
        character
            .apply(
                CharacterPatch::new()
                    .with_model_3d(AssetRef::new("u1/k.glb").expect("valid asset"))
                    .with_merchandise_refs(json!(["u1/mug.png"]))
                    .with_merchandise_status(GenerationStatus::Processing),
            )
            .expect("patch applies");
        character
    }

    #[rstest]
    fn stored_row_restores_the_character(enriched: UserIpCharacter) {
        let restored = row_to_character(to_row(&enriched)).expect("row maps back");
        assert_eq!(restored, enriched);
    }

    #[test]
    fn patch_changeset_writes_only_the_fields_it_sets() {
        let changes = to_patch_changeset(
            &CharacterPatch::new().with_merchandise_status(GenerationStatus::Processing),
        );
        assert_eq!(changes.merchandise_task_status.as_deref(), Some("processing"));
        assert!(changes.name.is_none());
        assert!(changes.left_view_url.is_none());
        assert!(changes.merchandise_urls.is_none());
    }

    #[test]
    fn cancelled_statement_reports_an_exceeded_deadline() {
        let cancelled = DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("canceling statement due to statement timeout".to_owned()),
        );
        assert!(matches!(
            database_error(cancelled),
            CharacterRepositoryError::DeadlineExceeded
        ));
    }

    #[rstest]
    fn blank_owner_is_a_persistence_error(enriched: UserIpCharacter) {
        let mut row = to_row(&enriched);
        row.user_id = String::new();
        assert!(matches!(
            row_to_character(row),
            Err(CharacterRepositoryError::Persistence(_))
        ));
    }
}
