//! Error types for the exporter crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors that can occur while exporting sensor readings.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExporterError {
    /// No trusted reading has been received yet.
    #[error("no reading available yet")]
    NoReading,

    /// An error propagated from the sensor layer.
    #[error("sensor error: {0}")]
    Sensor(#[from] pms7003_sensor::SensorError),

    /// The Prometheus recorder could not be installed.
    #[error("metrics recorder: {0}")]
    Recorder(String),

    /// Underlying I/O error (e.g. binding the listen address).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        let status = match &self {
            ExporterError::NoReading => StatusCode::SERVICE_UNAVAILABLE,
            ExporterError::Sensor(_) | ExporterError::Recorder(_) | ExporterError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reading_maps_to_503() {
        let resp = ExporterError::NoReading.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn sensor_error_maps_to_500() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged");
        let err = ExporterError::Sensor(pms7003_sensor::SensorError::Io(io));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "sensor errors must map to 500"
        );
    }

    #[test]
    fn recorder_error_display_includes_message() {
        let msg = ExporterError::Recorder("already installed".to_owned()).to_string();
        assert!(msg.contains("already installed"), "Display must include the message");
    }
}
