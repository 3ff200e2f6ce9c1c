//! Fuzz target: AQI computation stays within [0, 500] for any input.
#![no_main]

use libfuzzer_sys::fuzz_target;
use pms7003_core::{aqi, Category, Pollutant, AQI_MAX};

fuzz_target!(|input: (f64, bool)| {
    let (concentration, pm10) = input;
    let pollutant = if pm10 { Pollutant::Pm10 } else { Pollutant::Pm2_5 };
    let index = aqi(pollutant, concentration);
    assert!((0.0..=AQI_MAX).contains(&index), "aqi {index} for {concentration}");
    let _ = Category::of(index);
});
