//! Glue between the serial read loop and the exported state.

use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pms7003_core::{CoreError, Frame};
use pms7003_sensor::report::Report;
use pms7003_sensor::{port, FrameSink, SensorConfig, SensorError, SensorReader, SettleFilter};
use tracing::{info, warn};

use crate::{metrics, state::LatestReading};

/// Frame sink that applies the settle period, then publishes each reading
/// to metrics, the latest-reading slot and optionally an echo writer.
pub struct ExportSink<W = io::Stdout> {
    settle: SettleFilter,
    latest: Arc<LatestReading>,
    echo: bool,
    out: W,
}

impl ExportSink {
    /// Sink that echoes to stdout when `echo` is set.
    #[must_use]
    pub fn new(settle_time: Duration, latest: Arc<LatestReading>, echo: bool) -> Self {
        Self::with_writer(settle_time, latest, echo, io::stdout())
    }
}

impl<W: Write> ExportSink<W> {
    #[must_use]
    pub fn with_writer(
        settle_time: Duration,
        latest: Arc<LatestReading>,
        echo: bool,
        out: W,
    ) -> Self {
        Self { settle: SettleFilter::new(settle_time), latest, echo, out }
    }

    /// Handle a frame observed at `now`. Returns whether it was trusted.
    pub fn accept(&mut self, frame: Frame, now: Instant) -> bool {
        if self.settle.is_waiting_for_first() && self.echo && !self.settle.settle_time().is_zero() {
            let settle_time = self.settle.settle_time();
            if let Err(e) = writeln!(self.out, "Waiting {settle_time:?} until data is trusted...") {
                warn!(error = %e, "failed to echo settle notice");
            }
        }
        if !self.settle.admit(now) {
            info!(
                remaining_ms = self.settle.remaining(now).as_millis(),
                ?frame,
                "data not yet trusted, ignoring"
            );
            metrics::record_untrusted();
            return false;
        }

        metrics::record_frame(&frame);
        self.latest.update(frame);
        if self.echo {
            if let Err(e) = write!(self.out, "{}", Report(&frame)).and_then(|()| self.out.flush()) {
                warn!(error = %e, "failed to echo reading");
            }
        }
        true
    }
}

impl<W: Write> FrameSink for ExportSink<W> {
    fn on_frame(&mut self, frame: Frame) {
        self.accept(frame, Instant::now());
    }

    fn on_reject(&mut self, error: &CoreError) {
        metrics::record_rejected(error);
    }
}

/// Open the sensor described by `config` and feed it into `sink` until
/// `shutdown` is set.
///
/// # Errors
/// Returns [`SensorError::Open`] if the port cannot be opened and
/// [`SensorError::Io`] if the line fails while reading.
pub fn run_sensor<W: Write>(
    config: SensorConfig,
    sink: &mut ExportSink<W>,
    shutdown: &AtomicBool,
) -> Result<(), SensorError> {
    let serial = port::open(&config)?;
    let mut reader = SensorReader::new(serial, config);
    reader.initialise()?;
    reader.run(sink, shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_inside_settle_period_are_not_published() {
        let latest = Arc::new(LatestReading::new());
        let mut sink = ExportSink::new(Duration::from_secs(30), Arc::clone(&latest), false);
        let t0 = Instant::now();
        let frame = Frame { pm2_5_cf1: 11, ..Frame::default() }.sealed();

        assert!(!sink.accept(frame, t0));
        assert!(!sink.accept(frame, t0 + Duration::from_secs(10)));
        assert!(latest.get().is_none(), "untrusted frames must not reach the slot");

        assert!(sink.accept(frame, t0 + Duration::from_secs(30)));
        assert_eq!(latest.get().map(|r| r.frame), Some(frame));
    }

    #[test]
    fn zero_settle_time_publishes_immediately() {
        let latest = Arc::new(LatestReading::new());
        let mut sink = ExportSink::new(Duration::ZERO, Arc::clone(&latest), false);
        sink.on_frame(Frame { pm10_cf1: 20, ..Frame::default() }.sealed());
        assert_eq!(latest.get().map(|r| r.frame.pm10_cf1), Some(20));
    }

    #[test]
    fn echo_prints_settle_notice_once_then_the_report() {
        let latest = Arc::new(LatestReading::new());
        let mut out = Vec::new();
        let t0 = Instant::now();
        let frame = Frame { pm2_5_cf1: 4, pm10_cf1: 7, ..Frame::default() }.sealed();
        {
            let mut sink = ExportSink::with_writer(Duration::from_secs(5), latest, true, &mut out);
            assert!(!sink.accept(frame, t0));
            assert!(!sink.accept(frame, t0 + Duration::from_secs(1)));
            assert!(sink.accept(frame, t0 + Duration::from_secs(5)));
        }
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("until data is trusted").count(), 1, "got {text}");
        assert!(text.starts_with("Waiting 5s until data is trusted...\n"), "got {text}");
        assert!(text.ends_with(&pms7003_sensor::report::render(&frame)), "got {text}");
    }

    #[test]
    fn echo_disabled_writes_nothing() {
        let latest = Arc::new(LatestReading::new());
        let mut out = Vec::new();
        {
            let mut sink = ExportSink::with_writer(Duration::from_secs(5), latest, false, &mut out);
            let t0 = Instant::now();
            sink.accept(Frame::default().sealed(), t0);
            sink.accept(Frame::default().sealed(), t0 + Duration::from_secs(6));
        }
        assert!(out.is_empty());
    }

    #[test]
    fn run_sensor_reports_missing_device() {
        let latest = Arc::new(LatestReading::new());
        let mut sink = ExportSink::new(Duration::ZERO, latest, false);
        let shutdown = AtomicBool::new(false);
        let config = SensorConfig::new("/dev/pms7003-does-not-exist");
        let result = run_sensor(config, &mut sink, &shutdown);
        assert!(matches!(result, Err(SensorError::Open { .. })), "got {result:?}");
    }
}
