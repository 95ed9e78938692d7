//! Error types for task domain validation and parsing.

use super::{GenerationStatus, TaskId};
use crate::access::AccessDomainError;
use crate::error::ErrorKind;
use crate::identity::domain::IdentityDomainError;
use thiserror::Error;

/// Errors returned while constructing or mutating generation tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The prompt is empty after trimming.
    #[error("task prompt must not be empty")]
    EmptyPrompt,

    /// The task type is empty after trimming.
    #[error("task type must not be empty")]
    EmptyTaskType,

    /// The task type exceeds [`MAX_TASK_TYPE_CHARS`](super::MAX_TASK_TYPE_CHARS).
    #[error("task type must not exceed {max} characters, got {actual}")]
    TaskTypeTooLong {
        /// Largest accepted length.
        max: usize,
        /// Length supplied.
        actual: usize,
    },

    /// The batch identifier is empty after trimming.
    #[error("batch identifier must not be empty")]
    EmptyBatchId,

    /// A failure was reported without a message.
    #[error("failure message must not be empty")]
    EmptyErrorMessage,

    /// The owner identifier is malformed.
    #[error(transparent)]
    InvalidOwner(#[from] IdentityDomainError),

    /// An asset reference is malformed.
    #[error(transparent)]
    InvalidAsset(#[from] AccessDomainError),

    /// The state machine does not allow the requested edge.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Task that rejected the transition.
        task_id: TaskId,
        /// Status at the time of the request.
        from: GenerationStatus,
        /// Requested status.
        to: GenerationStatus,
    },
}

impl TaskDomainError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            _ => ErrorKind::Validation,
        }
    }
}

/// Error returned while parsing a generation status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown generation status: {0}")]
pub struct ParseGenerationStatusError(pub String);
