//! Timeout guard applied to every storage call made by a service.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// A service stopped waiting for a storage call.
///
/// The outcome of the call is unknown: a write may still have been applied
/// after the service gave up. Re-read the record before retrying a write.
/// The `PostgreSQL` adapters enforce a shorter deadline inside the database
/// and report it as a repository error with [`ErrorKind::Timeout`], which
/// does guarantee that nothing was written; this guard only fires when that
/// deadline failed to stop the call.
///
/// [`ErrorKind::Timeout`]: crate::ErrorKind::Timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("storage operation '{operation}' timed out after {limit:?}")]
pub struct StorageTimeout {
    /// Name of the repository operation that timed out.
    pub operation: &'static str,
    /// Configured limit that was exceeded.
    pub limit: Duration,
}

/// Awaits `future`, failing with [`StorageTimeout`] once `limit` elapses.
pub(crate) async fn bounded<F, T>(
    limit: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, StorageTimeout>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, future).await.map_err(|_| {
        warn!(operation, ?limit, "storage call timed out");
        StorageTimeout { operation, limit }
    })
}

#[cfg(test)]
mod tests {
    use super::{StorageTimeout, bounded};
    use std::time::Duration;

    #[tokio::test]
    async fn completes_within_limit() {
        let result = bounded(Duration::from_secs(1), "noop", async { 7_u8 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn stalled_future_times_out() {
        let limit = Duration::from_millis(5);
        let result = bounded(limit, "stall", std::future::pending::<()>()).await;
        assert_eq!(
            result,
            Err(StorageTimeout {
                operation: "stall",
                limit
            })
        );
    }
}
