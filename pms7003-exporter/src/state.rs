//! Shared state between the read loop and the HTTP handlers.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use pms7003_core::{aqi, Category, Frame, Pollutant};
use serde::Serialize;

/// A trusted reading together with its derived air quality values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub frame: Frame,
    pub received_at: DateTime<Utc>,
    pub aqi_pm2_5: f64,
    pub aqi_pm10: f64,
    pub category: Category,
}

impl Reading {
    /// Derive AQI values from the CF=1 concentrations of `frame`.
    #[must_use]
    pub fn new(frame: Frame, received_at: DateTime<Utc>) -> Self {
        let aqi_pm2_5 = aqi(Pollutant::Pm2_5, f64::from(frame.pm2_5_cf1));
        let aqi_pm10 = aqi(Pollutant::Pm10, f64::from(frame.pm10_cf1));
        Self {
            frame,
            received_at,
            aqi_pm2_5,
            aqi_pm10,
            category: Category::of(aqi_pm2_5.max(aqi_pm10)),
        }
    }
}

/// Most recent trusted reading.
#[derive(Debug, Default)]
pub struct LatestReading {
    slot: RwLock<Option<Reading>>,
}

impl LatestReading {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored reading with one built from `frame`.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn update(&self, frame: Frame) {
        let reading = Reading::new(frame, Utc::now());
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut slot = self.slot.write().expect("latest reading write lock poisoned");
        *slot = Some(reading);
    }

    /// Return a copy of the stored reading, if any.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self) -> Option<Reading> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.slot
            .read()
            .expect("latest reading read lock poisoned")
            .clone()
    }
}

/// State handed to every route handler.
#[derive(Clone, Default)]
pub struct AppState {
    pub latest: Arc<LatestReading>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// State without a Prometheus recorder; `/metrics` answers 503.
    #[must_use]
    pub fn new(latest: Arc<LatestReading>) -> Self {
        Self { latest, prometheus: None }
    }

    /// Attach the handle used to render `/metrics`.
    #[must_use]
    pub fn with_prometheus_handle(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
