//! Explicit retry schedule for service calls. The ingestion pipeline runs
//! with no retry by default; hosts that want bounded retry/backoff pass a
//! schedule without changing the state machine.

use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    schedule: Vec<Duration>,
}

impl RetryPolicy {
    /// One attempt, no retries. The pipeline default.
    pub fn none() -> Self {
        Self { schedule: Vec::new() }
    }

    /// One initial attempt plus one retry per schedule entry, sleeping the
    /// entry's duration before that retry.
    pub fn with_schedule(schedule: Vec<Duration>) -> Self {
        Self { schedule }
    }

    pub fn max_attempts(&self) -> usize {
        self.schedule.len() + 1
    }

    /// Delay to wait before retry number `retry` (0-based), if any remain.
    pub(crate) fn delay_before(&self, retry: usize) -> Option<Duration> {
        self.schedule.get(retry).copied()
    }
}
