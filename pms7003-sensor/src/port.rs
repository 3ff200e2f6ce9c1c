//! Opening and enumerating serial devices.

use serialport::SerialPort;
use tracing::info;

use crate::{SensorConfig, SensorError};

/// Open the serial device named in `config` (8N1, configured baud rate).
///
/// # Errors
/// Returns [`SensorError::Open`] if the device does not exist or cannot be
/// configured.
pub fn open(config: &SensorConfig) -> Result<Box<dyn SerialPort>, SensorError> {
    info!(port = %config.port, baud = config.baud_rate, "opening serial port");
    serialport::new(config.port.as_str(), config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(|source| SensorError::Open { port: config.port.clone(), source })
}

/// Names of the serial devices present on this machine.
///
/// # Errors
/// Returns [`SensorError::Enumerate`] if the platform query fails.
pub fn available_ports() -> Result<Vec<String>, SensorError> {
    let ports = serialport::available_ports().map_err(SensorError::Enumerate)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
