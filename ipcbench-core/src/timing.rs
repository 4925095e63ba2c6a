//! Timing of a single bounded transfer.

use std::time::{Duration, Instant};

/// A pair of monotonic timestamps taken around one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSample {
    /// Timestamp taken immediately before the operation.
    pub start: Instant,
    /// Timestamp taken immediately after the operation.
    pub end: Instant,
}

impl TimingSample {
    /// Creates a sample from two timestamps.
    #[must_use]
    pub fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    /// Returns the elapsed time, saturating at zero.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    /// Returns the elapsed time in fractional seconds.
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

/// Wraps a transfer with start/stop timestamps.
pub struct TimedTransfer;

impl TimedTransfer {
    /// Runs `op`, capturing a timestamp right before and right after it.
    pub fn run<F, T>(op: F) -> (T, TimingSample)
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = op();
        let end = Instant::now();
        (result, TimingSample::new(start, end))
    }
}
