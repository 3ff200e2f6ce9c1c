//! Command-line interface of the `pms7003` binary.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use pms7003_core::Mode;
use pms7003_sensor::SensorConfig;

use crate::logging::LoggingConfig;

#[derive(Debug, Parser)]
#[command(name = "pms7003")]
#[command(version)]
#[command(about = "Prometheus exporter for the Plantower PMS7003 particulate sensor", long_about = None)]
pub struct Cli {
    /// Serial device the sensor is attached to
    #[arg(short, long, env = "PMS7003_PORT", required_unless_present = "list")]
    pub port: Option<String>,

    /// Address to serve /metrics on
    #[arg(short, long, env = "PMS7003_LISTEN", default_value = "0.0.0.0:9184")]
    pub listen: SocketAddr,

    /// Ignore readings for this many seconds after the first frame
    #[arg(long, env = "PMS7003_SETTLE_TIME", value_name = "SECS", default_value_t = 0)]
    pub settle_time: u64,

    /// Print every trusted reading to stdout
    #[arg(long)]
    pub echo: bool,

    /// Put the sensor in this reporting mode at start-up (active, passive)
    #[arg(long, env = "PMS7003_MODE")]
    pub mode: Option<Mode>,

    /// Seconds between read requests in passive mode
    #[arg(long, value_name = "SECS", default_value_t = 2)]
    pub poll_interval: u64,

    /// Wake the sensor from sleep at start-up
    #[arg(long)]
    pub wake: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// List available serial ports and exit
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Sensor configuration, or `None` when no port was given.
    #[must_use]
    pub fn sensor_config(&self) -> Option<SensorConfig> {
        let port = self.port.as_deref()?;
        let mut config = SensorConfig::new(port)
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_wake(self.wake);
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        Some(config)
    }

    #[must_use]
    pub fn settle_time(&self) -> Duration {
        Duration::from_secs(self.settle_time)
    }

    #[must_use]
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig { json_format: self.json_logs, ..LoggingConfig::default() }
    }
}
