//! Protocol and domain types for the Plantower PMS7003 particulate sensor.
//!
//! Decodes the sensor's 32-byte data frames, encodes host commands, and
//! derives the US EPA Air Quality Index from the reported concentrations.
//! Nothing here performs I/O.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod aqi;
pub mod command;
pub mod error;
pub mod frame;

pub use aqi::{aqi, Category, Pollutant, AQI_MAX};
pub use command::{Command, Mode, COMMAND_LEN};
pub use error::CoreError;
pub use frame::{
    checksum, decode, Decoded, Frame, FrameDecoder, BAUD_RATE, DATA_FRAME_LENGTH, FRAME_LEN,
    REPLY_FRAME_LENGTH, REPLY_LEN, START_MARKER,
};
