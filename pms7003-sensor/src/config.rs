//! Serial line and reporting configuration.

use std::time::Duration;

use pms7003_core::{Mode, BAUD_RATE};
use serde::{Deserialize, Serialize};

/// Configuration for reading a PMS7003 over a serial port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SensorConfig {
    /// Serial device path (e.g. `/dev/ttyUSB0`).
    pub port: String,

    /// Line speed. The sensor only speaks 9600 baud.
    pub baud_rate: u32,

    /// How long a single read may block before timing out.
    pub read_timeout: Duration,

    /// Pause after a read that returned no data.
    pub idle_backoff: Duration,

    /// Mode to put the sensor in at start-up; `None` leaves it untouched.
    pub mode: Option<Mode>,

    /// Period between read requests in passive mode.
    pub poll_interval: Duration,

    /// Send a wake command before anything else.
    pub wake: bool,
}

impl SensorConfig {
    /// Create a config for `port` with the sensor's defaults.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: BAUD_RATE,
            read_timeout: Duration::from_secs(1),
            idle_backoff: Duration::from_secs(1),
            mode: None,
            poll_interval: Duration::from_secs(2),
            wake: false,
        }
    }

    /// Set the start-up reporting mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the passive-mode polling period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the pause after an empty read.
    #[must_use]
    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff;
        self
    }

    /// Send a wake command at start-up.
    #[must_use]
    pub fn with_wake(mut self, wake: bool) -> Self {
        self.wake = wake;
        self
    }

    /// Whether the reader must request each frame itself.
    #[must_use]
    pub fn is_passive(&self) -> bool {
        self.mode == Some(Mode::Passive)
    }

    /// Pause after an empty read, never longer than the passive poll period.
    #[must_use]
    pub fn effective_backoff(&self) -> Duration {
        if self.is_passive() {
            self.idle_backoff.min(self.poll_interval)
        } else {
            self.idle_backoff
        }
    }
}
