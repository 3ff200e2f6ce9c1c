//! Blocking read loop over a serial line.
//!
//! The reader pulls bytes from the port, feeds them through a
//! [`FrameDecoder`], and hands every valid frame to a [`FrameSink`]. In
//! passive mode it also issues a read request every poll interval.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use pms7003_core::{Command, CoreError, Frame, FrameDecoder};
use tracing::{debug, info, warn};

use crate::{SensorConfig, SensorError};

/// Bytes requested from the port per read.
const READ_CHUNK: usize = 64;

/// Receives decoded frames from a [`SensorReader`].
pub trait FrameSink {
    /// Called for each frame that passed validation.
    fn on_frame(&mut self, frame: Frame);

    /// Called for each candidate frame that failed validation.
    fn on_reject(&mut self, error: &CoreError) {
        let _ = error;
    }
}

impl<F: FnMut(Frame)> FrameSink for F {
    fn on_frame(&mut self, frame: Frame) {
        self(frame);
    }
}

/// Result of a single [`SensorReader::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes arrived; `frames` valid frames were delivered.
    Data { bytes: usize, frames: usize },
    /// The read timed out or returned nothing.
    Idle,
}

/// Reads PMS7003 frames from any byte stream that can also accept commands.
pub struct SensorReader<P> {
    port: P,
    config: SensorConfig,
    decoder: FrameDecoder,
    last_request: Option<Instant>,
}

impl<P: Read + Write> SensorReader<P> {
    /// Wrap an already opened port.
    #[must_use]
    pub fn new(port: P, config: SensorConfig) -> Self {
        Self { port, config, decoder: FrameDecoder::new(), last_request: None }
    }

    /// Configuration this reader was built with.
    #[must_use]
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Number of noise bytes discarded so far.
    #[must_use]
    pub fn skipped_bytes(&self) -> u64 {
        self.decoder.skipped()
    }

    /// Give back the underlying port.
    pub fn into_inner(self) -> P {
        self.port
    }

    /// Write a command frame to the sensor.
    ///
    /// # Errors
    /// Returns [`SensorError::Io`] if the write fails.
    pub fn send(&mut self, command: Command) -> Result<(), SensorError> {
        debug!(?command, "sending command");
        self.port.write_all(&command.to_bytes())?;
        self.port.flush()?;
        Ok(())
    }

    /// Apply the start-up commands from the configuration.
    ///
    /// # Errors
    /// Returns [`SensorError::Io`] if a command cannot be written.
    pub fn initialise(&mut self) -> Result<(), SensorError> {
        if self.config.wake {
            self.send(Command::Wake)?;
        }
        if let Some(mode) = self.config.mode {
            info!(%mode, "setting sensor mode");
            self.send(Command::SetMode(mode))?;
        }
        Ok(())
    }

    /// Perform one read and deliver any completed frames to `sink`.
    ///
    /// # Errors
    /// Returns [`SensorError::Io`] for any I/O failure other than a timeout.
    pub fn poll<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<ReadOutcome, SensorError> {
        let mut buf = [0u8; READ_CHUNK];
        let bytes = match self.port.read(&mut buf) {
            Ok(0) => return Ok(ReadOutcome::Idle),
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                return Ok(ReadOutcome::Idle);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(ReadOutcome::Idle),
            Err(e) => return Err(e.into()),
        };
        debug!(bytes, "read from sensor");

        self.decoder.push(&buf[..bytes]);
        let mut frames = 0;
        while let Some(result) = self.decoder.next_frame() {
            match result {
                Ok(frame) => {
                    debug!(?frame, "decoded frame");
                    frames += 1;
                    sink.on_frame(frame);
                }
                Err(e) => {
                    warn!(error = %e, "rejected frame");
                    sink.on_reject(&e);
                }
            }
        }
        Ok(ReadOutcome::Data { bytes, frames })
    }

    /// Send a passive read request if the poll interval has elapsed.
    ///
    /// # Errors
    /// Returns [`SensorError::Io`] if the request cannot be written.
    pub fn request_if_due(&mut self, now: Instant) -> Result<bool, SensorError> {
        if !self.config.is_passive() {
            return Ok(false);
        }
        let due = self
            .last_request
            .is_none_or(|last| now.saturating_duration_since(last) >= self.config.poll_interval);
        if due {
            self.send(Command::ReadPassive)?;
            self.last_request = Some(now);
        }
        Ok(due)
    }

    /// Read until `shutdown` is set or an unrecoverable error occurs.
    ///
    /// Timeouts are not errors: the loop sleeps for the configured backoff
    /// and tries again.
    ///
    /// # Errors
    /// Returns [`SensorError::Io`] on any I/O failure other than a timeout.
    pub fn run<S: FrameSink + ?Sized>(
        &mut self,
        sink: &mut S,
        shutdown: &AtomicBool,
    ) -> Result<(), SensorError> {
        info!(port = %self.config.port, passive = self.config.is_passive(), "starting read loop");
        while !shutdown.load(Ordering::Relaxed) {
            self.request_if_due(Instant::now())?;
            if self.poll(sink)? == ReadOutcome::Idle {
                let backoff = self.config.effective_backoff();
                debug!(backoff_ms = backoff.as_millis(), "no data, sleeping");
                thread::sleep(backoff);
            }
        }
        info!(skipped_bytes = self.decoder.skipped(), "read loop stopped");
        Ok(())
    }
}
