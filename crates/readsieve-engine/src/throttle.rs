//! Minimum inter-cycle interval

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum wall-clock spacing between cycle starts
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    /// Create a throttle with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Suspend until `interval` has passed since `cycle_start`.
    ///
    /// Returns how long it slept; a cycle that already took longer does not
    /// sleep at all.
    pub async fn wait(&self, cycle_start: Instant) -> Duration {
        let deadline = cycle_start + self.interval;
        let now = Instant::now();
        if now >= deadline {
            return Duration::ZERO;
        }
        sleep_until(deadline).await;
        deadline - now
    }
}
