//! Deadline-bounded blocking helpers shared by the `PostgreSQL` adapters.
//!
//! Each repository call checks out a connection and runs inside a single
//! transaction whose `statement_timeout` is whatever is left of the call
//! deadline. Work that overruns is cancelled and rolled back by the server,
//! so a call that reports an expired deadline has written nothing.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use std::time::{Duration, Instant};

/// `PostgreSQL` connection pool used by the adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Largest value `statement_timeout` accepts, in milliseconds.
const MAX_STATEMENT_TIMEOUT_MS: u128 = 2_147_483_647;

/// Failure of a deadline-bounded call.
#[derive(Debug)]
pub(crate) enum GuardedError<E> {
    /// The deadline passed before the work finished; the transaction was
    /// never committed.
    Expired,
    /// The database rejected the transaction setup or commit.
    Database(DieselError),
    /// The work itself failed and its transaction was rolled back.
    Work(E),
}

impl<E> From<DieselError> for GuardedError<E> {
    fn from(err: DieselError) -> Self {
        if is_statement_timeout(&err) {
            Self::Expired
        } else {
            Self::Database(err)
        }
    }
}

/// Returns `true` when the server cancelled a statement because the
/// transaction's `statement_timeout` elapsed.
pub(crate) fn is_statement_timeout(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(_, info) if info.message().contains("statement timeout")
    )
}

/// Runs `work` in a transaction that the server aborts once `deadline`,
/// measured from the start of the connection checkout, has passed.
pub(crate) fn run_with_deadline<T, E>(
    pool: &PgPool,
    deadline: Duration,
    work: impl FnOnce(&mut PgConnection) -> Result<T, E>,
) -> Result<T, GuardedError<E>> {
    let started = Instant::now();
    let mut pooled = pool
        .get_timeout(deadline)
        .map_err(|_| GuardedError::Expired)?;
    let remaining_ms = deadline
        .saturating_sub(started.elapsed())
        .as_millis()
        .min(MAX_STATEMENT_TIMEOUT_MS);
    if remaining_ms == 0 {
        return Err(GuardedError::Expired);
    }

    let connection: &mut PgConnection = &mut pooled;
    connection.transaction(|tx| {
        diesel::sql_query(format!("SET LOCAL statement_timeout = {remaining_ms}")).execute(tx)?;
        work(tx).map_err(GuardedError::Work)
    })
}
