//! Error types for the sensor crate.

/// Errors that can occur while talking to the sensor.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SensorError {
    /// The serial device could not be opened.
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Serial devices could not be enumerated.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),

    /// A protocol-level error from the frame codec.
    #[error(transparent)]
    Core(#[from] pms7003_core::CoreError),

    /// Underlying I/O error on the serial line.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
