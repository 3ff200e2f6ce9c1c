//! Warm-up filter for freshly started sensors.
//!
//! The fan needs time to reach a steady flow after power-up, so readings
//! during the first `settle_time` are not trusted.

use std::time::{Duration, Instant};

/// Decides whether a reading arrived late enough to be trusted.
#[derive(Debug, Clone)]
pub struct SettleFilter {
    settle_time: Duration,
    started: Option<Instant>,
}

impl SettleFilter {
    /// The clock starts at the first observed reading, not at construction.
    #[must_use]
    pub fn new(settle_time: Duration) -> Self {
        Self { settle_time, started: None }
    }

    /// Configured settle period.
    #[must_use]
    pub fn settle_time(&self) -> Duration {
        self.settle_time
    }

    /// `true` until the first reading has been observed.
    #[must_use]
    pub fn is_waiting_for_first(&self) -> bool {
        self.started.is_none()
    }

    /// Record a reading observed at `now` and report whether it is trusted.
    pub fn admit(&mut self, now: Instant) -> bool {
        let started = *self.started.get_or_insert(now);
        now.saturating_duration_since(started) >= self.settle_time
    }

    /// Time left until readings are trusted, zero once settled.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.started {
            Some(started) => self.settle_time.saturating_sub(now.saturating_duration_since(started)),
            None => self.settle_time,
        }
    }
}
