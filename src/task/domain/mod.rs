//! Domain model for generation tasks.
//!
//! Nothing in here touches storage or the caller identity; authorization is
//! applied by the service layer before these types are mutated.

mod error;
mod ids;
mod status;
mod task;

pub use error::{ParseGenerationStatusError, TaskDomainError};
pub use ids::{BatchId, TaskId};
pub use status::GenerationStatus;
pub use task::{
    GenerationTask, MAX_TASK_TYPE_CHARS, PersistedTaskData, TaskSubmission, TaskTransition,
};
