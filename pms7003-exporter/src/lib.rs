//! Prometheus exporter for the Plantower PMS7003 particulate sensor.
//!
//! Runs the serial read loop on a blocking thread, publishes each trusted
//! reading as gauges, and serves `/metrics`, `/v1/reading` and `/health`.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod routes;
pub mod state;
