//! Diesel schema for character persistence.

diesel::table! {
    /// User-owned character records.
    user_ip_characters (id) {
        /// Character identifier.
        id -> Uuid,
        /// Owning identity.
        user_id -> Text,
        /// Display name.
        #[max_length = 200]
        name -> Varchar,
        /// Description.
        description -> Nullable<Text>,
        /// Main image reference.
        main_image_url -> Text,
        /// Left view reference.
        left_view_url -> Nullable<Text>,
        /// Back view reference.
        back_view_url -> Nullable<Text>,
        /// 3D model reference.
        model_3d_url -> Nullable<Text>,
        /// Merchandise references.
        merchandise_urls -> Nullable<Jsonb>,
        /// Merchandise sub-job status.
        #[max_length = 20]
        merchandise_task_status -> Nullable<Varchar>,
        /// Task that produced the character.
        source_task_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
