//! Prometheus metrics for sensor readings.
//!
//! Readings are published through the `metrics` facade; the Prometheus
//! recorder renders them for `GET /metrics`.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use pms7003_core::{aqi, CoreError, Frame, Pollutant};

use crate::error::ExporterError;

pub const PARTICLE_CONCENTRATION_STANDARD: &str = "particle_concentration_standard";
pub const PARTICLE_CONCENTRATION_ENVIRONMENT: &str = "particle_concentration_environment";
pub const PARTICLE_COUNT: &str = "particle_count";
pub const AIR_QUALITY_INDEX: &str = "air_quality_index";
pub const FRAMES_TOTAL: &str = "pms7003_frames_total";
pub const FRAMES_REJECTED_TOTAL: &str = "pms7003_frames_rejected_total";
pub const FRAMES_UNTRUSTED_TOTAL: &str = "pms7003_frames_untrusted_total";

const SIZE_LABEL: &str = "particle_size";

/// Install the Prometheus recorder as the global `metrics` recorder.
///
/// # Errors
/// Returns [`ExporterError::Recorder`] if a global recorder is already set.
pub fn install_recorder() -> Result<PrometheusHandle, ExporterError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ExporterError::Recorder(e.to_string()))
}

/// Register metric descriptions. Call once after installing the recorder.
pub fn register_metrics() {
    describe_gauge!(
        PARTICLE_CONCENTRATION_STANDARD,
        "concentration (CF=1 standard particle) µg/m³"
    );
    describe_gauge!(
        PARTICLE_CONCENTRATION_ENVIRONMENT,
        "concentration (under atmospheric environment) µg/m³"
    );
    describe_gauge!(
        PARTICLE_COUNT,
        "number of particles with diameter beyond particle_size"
    );
    describe_gauge!(
        AIR_QUALITY_INDEX,
        "air quality index (aqi) defined by united states environmental protection agency (us epa)"
    );
    describe_counter!(FRAMES_TOTAL, "Total number of valid frames received from the sensor");
    describe_counter!(
        FRAMES_REJECTED_TOTAL,
        "Total number of candidate frames that failed validation"
    );
    describe_counter!(
        FRAMES_UNTRUSTED_TOTAL,
        "Total number of frames ignored during the settle period"
    );
}

/// Publish every value of a trusted frame.
pub fn record_frame(frame: &Frame) {
    for (size, value) in [("1.0", frame.pm1_cf1), ("2.5", frame.pm2_5_cf1), ("10.0", frame.pm10_cf1)] {
        gauge!(PARTICLE_CONCENTRATION_STANDARD, SIZE_LABEL => size).set(f64::from(value));
    }
    for (size, value) in [("1.0", frame.pm1_atmo), ("2.5", frame.pm2_5_atmo), ("10.0", frame.pm10_atmo)] {
        gauge!(PARTICLE_CONCENTRATION_ENVIRONMENT, SIZE_LABEL => size).set(f64::from(value));
    }
    for (size, value) in [
        ("0.3", frame.pm0_3_count),
        ("0.5", frame.pm0_5_count),
        ("1.0", frame.pm1_0_count),
        ("2.5", frame.pm2_5_count),
        ("5.0", frame.pm5_0_count),
        ("10.0", frame.pm10_0_count),
    ] {
        gauge!(PARTICLE_COUNT, SIZE_LABEL => size).set(f64::from(value));
    }
    for (pollutant, concentration) in [
        (Pollutant::Pm2_5, frame.pm2_5_cf1),
        (Pollutant::Pm10, frame.pm10_cf1),
    ] {
        gauge!(AIR_QUALITY_INDEX, SIZE_LABEL => pollutant.particle_size())
            .set(aqi(pollutant, f64::from(concentration)));
    }
    counter!(FRAMES_TOTAL).increment(1);
}

/// Count a candidate frame that failed validation.
pub fn record_rejected(error: &CoreError) {
    counter!(FRAMES_REJECTED_TOTAL, "reason" => error.kind()).increment(1);
}

/// Count a frame ignored during the settle period.
pub fn record_untrusted() {
    counter!(FRAMES_UNTRUSTED_TOTAL).increment(1);
}
