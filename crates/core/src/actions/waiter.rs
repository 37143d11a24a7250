//! Deadline-aware sleeping
//!
//! A [`Waiter`] sleeps between polls and reports when its deadline has
//! passed. Time comes from tokio's clock so paused-time tests stay
//! deterministic.

use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Sleeps between polls and reports when the deadline is exceeded
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    deadline: Option<Instant>,
}

impl Waiter {
    /// Create a waiter whose deadline is `timeout` from now.
    ///
    /// `None`, a zero timeout and a timeout too large to represent as an
    /// instant all mean "no deadline".
    pub fn new(timeout: Option<Duration>) -> Self {
        let now = Instant::now();
        let deadline = timeout.filter(|t| !t.is_zero()).and_then(|t| now.checked_add(t));
        Self { deadline }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Sleep for `interval`, clamped to the deadline.
    ///
    /// Returns `true` without sleeping once the deadline has been reached.
    /// A sleep that would cross the deadline is cut short and returns
    /// `false`, so the caller gets one last poll before the next call
    /// reports `true`.
    pub async fn wait(&self, interval: Duration) -> bool {
        let Some(deadline) = self.deadline else {
            sleep(interval).await;
            return false;
        };

        let now = Instant::now();
        if now >= deadline {
            return true;
        }

        if now.checked_add(interval).is_some_and(|wake| wake < deadline) {
            sleep(interval).await;
        } else {
            sleep(deadline.saturating_duration_since(now)).await;
        }
        false
    }
}
