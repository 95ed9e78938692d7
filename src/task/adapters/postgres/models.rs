//! Diesel row models for generation task persistence.

use super::schema::generation_tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = generation_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning identity.
    pub user_id: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Classification string.
    pub task_type: String,
    /// Prompt text.
    pub prompt: String,
    /// Input image reference.
    pub input_image_url: Option<String>,
    /// Result image reference.
    pub result_image_url: Option<String>,
    /// Structured result payload.
    pub result_data: Option<Value>,
    /// Failure message.
    pub error_message: Option<String>,
    /// Batch grouping key.
    pub batch_id: Option<String>,
    /// Parent character identifier.
    pub parent_character_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = generation_tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning identity.
    pub user_id: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Classification string.
    pub task_type: String,
    /// Prompt text.
    pub prompt: String,
    /// Input image reference.
    pub input_image_url: Option<String>,
    /// Result image reference.
    pub result_image_url: Option<String>,
    /// Structured result payload.
    pub result_data: Option<Value>,
    /// Failure message.
    pub error_message: Option<String>,
    /// Batch grouping key.
    pub batch_id: Option<String>,
    /// Parent character identifier.
    pub parent_character_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written by a lifecycle transition.
///
/// Identity, ownership, inputs and `created_at` are absent on purpose: they
/// are immutable after creation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = generation_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskTransitionChangeset {
    /// New lifecycle status.
    pub status: String,
    /// Result image reference.
    pub result_image_url: Option<String>,
    /// Structured result payload.
    pub result_data: Option<Value>,
    /// Failure message.
    pub error_message: Option<String>,
    /// Refreshed update timestamp.
    pub updated_at: DateTime<Utc>,
}
