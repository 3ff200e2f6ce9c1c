//! US EPA Air Quality Index.
//!
//! Ranges: <https://en.wikipedia.org/wiki/Air_quality_index>
//! Breakpoints: <https://aqs.epa.gov/aqsweb/documents/codetables/aqi_breakpoints.html>

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index bands, one per breakpoint row.
pub const AQI_RANGES: [(f64, f64); 7] = [
    (0.0, 50.0),
    (51.0, 100.0),
    (101.0, 150.0),
    (151.0, 200.0),
    (201.0, 300.0),
    (301.0, 400.0),
    (401.0, 500.0),
];

/// PM2.5 24-hour breakpoints in µg/m³.
pub const PM2_5_BREAKPOINTS: [(f64, f64); 7] = [
    (0.0, 12.0),
    (12.1, 35.4),
    (35.5, 55.4),
    (55.5, 150.4),
    (150.5, 250.4),
    (250.5, 350.4),
    (350.5, 500.4),
];

/// PM10 24-hour breakpoints in µg/m³.
pub const PM10_BREAKPOINTS: [(f64, f64); 7] = [
    (0.0, 54.0),
    (55.0, 154.0),
    (155.0, 254.0),
    (255.0, 354.0),
    (355.0, 424.0),
    (425.0, 504.0),
    (505.0, 604.0),
];

/// Highest index value reported.
pub const AQI_MAX: f64 = AQI_RANGES[AQI_RANGES.len() - 1].1;

/// A pollutant with an EPA breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm2_5,
    Pm10,
}

impl Pollutant {
    /// Breakpoint table for this pollutant.
    #[must_use]
    pub fn breakpoints(self) -> &'static [(f64, f64); 7] {
        match self {
            Pollutant::Pm2_5 => &PM2_5_BREAKPOINTS,
            Pollutant::Pm10 => &PM10_BREAKPOINTS,
        }
    }

    /// Particle size label used in metric labels.
    #[must_use]
    pub fn particle_size(self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "2.5",
            Pollutant::Pm10 => "10.0",
        }
    }
}

/// Compute the AQI for a concentration in µg/m³.
///
/// The concentration is rounded to the nearest tenth, matched to the band
/// whose low breakpoint is the greatest one below it, then linearly
/// interpolated:
///
/// `I = (I_hi - I_lo) / (C_hi - C_lo) * (C - C_lo) + I_lo`
///
/// Non-positive input yields 0; the result never exceeds [`AQI_MAX`].
#[must_use]
pub fn aqi(pollutant: Pollutant, concentration: f64) -> f64 {
    let rounded = (concentration * 10.0).round() / 10.0;
    if rounded.is_nan() || rounded <= 0.0 {
        return 0.0;
    }
    let breakpoints = pollutant.breakpoints();
    let band = breakpoints
        .partition_point(|(low, _)| rounded > *low)
        .saturating_sub(1);
    let (c_lo, c_hi) = breakpoints[band];
    let (i_lo, i_hi) = AQI_RANGES[band];
    let index = (i_hi - i_lo) / (c_hi - c_lo) * (rounded - c_lo) + i_lo;
    index.min(AQI_MAX)
}

/// Health concern level for an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    /// Classify an AQI value.
    #[must_use]
    pub fn of(aqi: f64) -> Self {
        match aqi {
            a if a <= AQI_RANGES[0].1 => Category::Good,
            a if a <= AQI_RANGES[1].1 => Category::Moderate,
            a if a <= AQI_RANGES[2].1 => Category::UnhealthyForSensitiveGroups,
            a if a <= AQI_RANGES[3].1 => Category::Unhealthy,
            a if a <= AQI_RANGES[4].1 => Category::VeryUnhealthy,
            _ => Category::Hazardous,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Good => "good",
            Category::Moderate => "moderate",
            Category::UnhealthyForSensitiveGroups => "unhealthy for sensitive groups",
            Category::Unhealthy => "unhealthy",
            Category::VeryUnhealthy => "very unhealthy",
            Category::Hazardous => "hazardous",
        };
        f.write_str(label)
    }
}
