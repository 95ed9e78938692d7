//! Application services for generation task lifecycle orchestration.

mod lifecycle;
mod timestamps;

pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use timestamps::TimestampMaintainer;
