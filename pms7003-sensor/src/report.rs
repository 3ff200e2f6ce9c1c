//! Human-readable rendering of a reading for `--echo`.

use std::fmt;

use pms7003_core::Frame;

const RULE: &str = "------------------------------------------------";

/// Multi-line table view of a frame, as printed on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a>(pub &'a Frame);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Concentration units (standard)")?;
        writeln!(
            f,
            "pm1.0: {}\tpm2.5: {}\tpm10.0: {}",
            frame.pm1_cf1, frame.pm2_5_cf1, frame.pm10_cf1
        )?;
        writeln!(f)?;
        writeln!(f, "Concentration units (environmental)")?;
        writeln!(
            f,
            "pm1.0: {}\tpm2.5: {}\tpm10.0: {}",
            frame.pm1_atmo, frame.pm2_5_atmo, frame.pm10_atmo
        )?;
        writeln!(f)?;
        writeln!(f, "Particle counts")?;
        writeln!(
            f,
            "pm0.3: {}\tpm0.5: {}\tpm1.0: {}",
            frame.pm0_3_count, frame.pm0_5_count, frame.pm1_0_count
        )?;
        writeln!(
            f,
            "pm2.5: {}\tpm5.0: {}\tpm10.0: {}",
            frame.pm2_5_count, frame.pm5_0_count, frame.pm10_0_count
        )?;
        writeln!(f, "{RULE}")
    }
}

/// Render a frame as the multi-line table printed on stdout.
#[must_use]
pub fn render(frame: &Frame) -> String {
    Report(frame).to_string()
}
