//! Helpers shared by unit tests across contexts.

use crate::identity::adapters::memory::InMemoryIdentityDirectory;
use crate::identity::domain::{IdentityRecord, UserId};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex};

/// Directory holding an active identity for each of `ids`.
pub(crate) fn directory_of(ids: &[&str]) -> Arc<InMemoryIdentityDirectory> {
    let records = ids
        .iter()
        .filter_map(|id| UserId::new(*id).ok())
        .map(|id| IdentityRecord::new(id, DateTime::default()));
    Arc::new(InMemoryIdentityDirectory::with_records(records))
}

/// Clock that advances by a fixed step on every reading and can be rewound.
#[derive(Debug)]
pub(crate) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub(crate) fn starting_at(seconds: i64) -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_opt(seconds, 0).single().unwrap_or_default()),
            step: Duration::seconds(1),
        }
    }

    pub(crate) fn rewind(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now -= by;
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let Ok(mut now) = self.now.lock() else {
            return DateTime::default();
        };
        let current = *now;
        *now = current + self.step;
        current
    }
}
