//! Diesel row models for character persistence.

use super::schema::user_ip_characters;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for character records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_ip_characters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CharacterRow {
    /// Character identifier.
    pub id: uuid::Uuid,
    /// Owning identity.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Main image reference.
    pub main_image_url: String,
    /// Left view reference.
    pub left_view_url: Option<String>,
    /// Back view reference.
    pub back_view_url: Option<String>,
    /// 3D model reference.
    pub model_3d_url: Option<String>,
    /// Merchandise references.
    pub merchandise_urls: Option<Value>,
    /// Merchandise sub-job status.
    pub merchandise_task_status: Option<String>,
    /// Task that produced the character.
    pub source_task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Column-wise changeset for progressive enrichment. `None` fields are
/// left out of the `UPDATE`, so each patch writes only what it sets. Owner,
/// source task and `created_at` are immutable and therefore absent.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = user_ip_characters)]
pub struct CharacterPatchChangeset {
    /// Display name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Main image reference.
    pub main_image_url: Option<String>,
    /// Left view reference.
    pub left_view_url: Option<String>,
    /// Back view reference.
    pub back_view_url: Option<String>,
    /// 3D model reference.
    pub model_3d_url: Option<String>,
    /// Merchandise references.
    pub merchandise_urls: Option<Value>,
    /// Merchandise sub-job status.
    pub merchandise_task_status: Option<String>,
}
