//! Pre-commit hook that refreshes task modification timestamps.

use crate::task::domain::GenerationTask;
use mockable::Clock;
use std::sync::Arc;
use tracing::trace;

/// Stamps `updated_at` on a task that passed validation and is about to be
/// written.
///
/// The lifecycle service invokes it exactly once per successful mutation,
/// after the state machine accepted the change and before the repository
/// write. Values produced elsewhere are overridden; the timestamp never moves
/// backwards even if the clock does.
#[derive(Debug)]
pub struct TimestampMaintainer<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> Clone for TimestampMaintainer<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> TimestampMaintainer<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a maintainer backed by `clock`.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Refreshes `task.updated_at` to the current time.
    pub fn stamp(&self, task: &mut GenerationTask) {
        task.touch(self.clock.utc());
        trace!(task_id = %task.id(), updated_at = %task.updated_at(), "task stamped");
    }
}
