//! Latency measurement utilities.

use hdrhistogram::Histogram;
use std::time::{Duration, Instant};

/// Latency statistics.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    /// Minimum latency.
    pub min: Duration,
    /// Maximum latency.
    pub max: Duration,
    /// Mean latency.
    pub mean: Duration,
    /// Median latency (p50).
    pub median: Duration,
    /// 99th percentile latency.
    pub p99: Duration,
    /// 99.9th percentile latency.
    pub p999: Duration,
    /// Sample count.
    pub count: usize,
}

/// Collects latency samples and computes statistics.
pub struct LatencyCollector {
    samples: Vec<Duration>,
}

impl LatencyCollector {
    /// Creates a new latency collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Creates a new latency collector with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Records a latency sample.
    pub fn record(&mut self, latency: Duration) {
        self.samples.push(latency);
    }

    /// Measures the latency of a function.
    pub fn measure<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        self.samples.push(start.elapsed());
        result
    }

    /// Computes statistics from collected samples.
    ///
    /// Percentiles come from an HDR histogram with three significant
    /// digits; min, max and mean are exact.
    #[must_use]
    pub fn stats(&self) -> Option<LatencyStats> {
        if self.samples.is_empty() {
            return None;
        }

        // Auto-resizing, so samples above the initial range are kept as is.
        let mut histogram = Histogram::<u64>::new(3).ok()?;
        for sample in &self.samples {
            histogram.record(nanos(*sample)).ok()?;
        }

        let count = self.samples.len();
        let min = self.samples.iter().min().copied()?;
        let max = self.samples.iter().max().copied()?;
        let total: u128 = self.samples.iter().map(Duration::as_nanos).sum();
        let mean = Duration::from_nanos(
            u64::try_from(total / count as u128).unwrap_or(u64::MAX),
        );

        Some(LatencyStats {
            min,
            max,
            mean,
            median: Duration::from_nanos(histogram.value_at_quantile(0.5)),
            p99: Duration::from_nanos(histogram.value_at_quantile(0.99)),
            p999: Duration::from_nanos(histogram.value_at_quantile(0.999)),
            count,
        })
    }

    /// Clears all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for LatencyCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
