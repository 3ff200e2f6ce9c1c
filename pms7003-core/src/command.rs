//! Host-to-sensor command frames.
//!
//! ```text
//! 0x42 0x4d | cmd | data (u16) | lrc (u16)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::frame::{checksum, START_MARKER};

/// Size of a command frame on the wire.
pub const COMMAND_LEN: usize = 7;

/// Reporting mode of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The sensor only reports when asked with [`Command::ReadPassive`].
    Passive,
    /// The sensor reports continuously (factory default).
    Active,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Passive => f.write_str("passive"),
            Mode::Active => f.write_str("active"),
        }
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passive" => Ok(Mode::Passive),
            "active" => Ok(Mode::Active),
            _ => Err(CoreError::InvalidMode { value: s.to_owned() }),
        }
    }
}

/// A command understood by the PMS7003.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Request one data frame while in passive mode.
    ReadPassive,
    /// Switch reporting mode.
    SetMode(Mode),
    /// Stop the fan and laser.
    Sleep,
    /// Resume measuring after [`Command::Sleep`].
    Wake,
}

impl Command {
    fn code(self) -> (u8, u16) {
        match self {
            Command::ReadPassive => (0xe2, 0x0000),
            Command::SetMode(Mode::Passive) => (0xe1, 0x0000),
            Command::SetMode(Mode::Active) => (0xe1, 0x0001),
            Command::Sleep => (0xe4, 0x0000),
            Command::Wake => (0xe4, 0x0001),
        }
    }

    /// Encode the command frame, including its trailing checksum.
    #[must_use]
    pub fn to_bytes(self) -> [u8; COMMAND_LEN] {
        let (cmd, data) = self.code();
        let [data_hi, data_lo] = data.to_be_bytes();
        let mut out = [START_MARKER[0], START_MARKER[1], cmd, data_hi, data_lo, 0, 0];
        let [lrc_hi, lrc_lo] = checksum(&out[..5]).to_be_bytes();
        out[5] = lrc_hi;
        out[6] = lrc_lo;
        out
    }
}
