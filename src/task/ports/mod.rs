//! Port contracts for generation task persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

pub use repository::{GenerationTaskRepository, TaskRepositoryError, TaskRepositoryResult};
