//! Serial-port access to a Plantower PMS7003 sensor.
//!
//! Opens the device, applies start-up commands, and runs a blocking read
//! loop that turns the raw byte stream into validated [`Frame`]s.
//!
//! [`Frame`]: pms7003_core::Frame

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod port;
pub mod reader;
pub mod report;
pub mod settle;

pub use config::SensorConfig;
pub use error::SensorError;
pub use reader::{FrameSink, ReadOutcome, SensorReader};
pub use settle::SettleFilter;
