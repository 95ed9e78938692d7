//! Diesel schema for generation task persistence.

diesel::table! {
    /// Generation task records.
    generation_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning identity; `NULL` for anonymous tasks.
        user_id -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Free-form classification.
        #[max_length = 100]
        task_type -> Varchar,
        /// Prompt text.
        prompt -> Text,
        /// Input image reference.
        input_image_url -> Nullable<Text>,
        /// Result image reference.
        result_image_url -> Nullable<Text>,
        /// Structured result payload.
        result_data -> Nullable<Jsonb>,
        /// Failure message.
        error_message -> Nullable<Text>,
        /// Batch grouping key.
        batch_id -> Nullable<Text>,
        /// Character this task derives from.
        parent_character_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
