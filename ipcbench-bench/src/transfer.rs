//! Repeated in-process transfers over each channel.
//!
//! Each iteration writes the payload through one attachment (or write end)
//! and reads it back through the other, so the sample covers both sides.

use crate::latency::{LatencyCollector, LatencyStats};
use ipcbench_core::{Comparison, Payload};
use ipcbench_transport::ipc::{SegmentKey, SharedMemoryConfig, SharedMemorySegment, pipe};
use ipcbench_transport::{PayloadSink, PayloadSource, Result, TransportError};

/// Bytes a pipe is guaranteed to buffer on Linux. A pipe transfer in a
/// single thread must fit, or the write blocks forever.
pub const PIPE_CAPACITY: usize = 64 * 1024;

/// Statistics of one channel over many transfers.
#[derive(Debug, Clone)]
pub struct TransferStats {
    /// Payload length in bytes.
    pub payload_len: usize,
    /// Per-transfer latency statistics.
    pub latency: LatencyStats,
}

impl TransferStats {
    /// Returns the median throughput in bytes per second.
    #[must_use]
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.latency.median.as_secs_f64();
        if secs > 0.0 {
            self.payload_len as f64 / secs
        } else {
            0.0
        }
    }

    /// Returns the median throughput in megabytes per second.
    #[must_use]
    pub fn mb_per_second(&self) -> f64 {
        self.bytes_per_second() / (1024.0 * 1024.0)
    }
}

/// Times `iterations` write-then-read cycles through a private shared
/// memory segment sized to the payload.
///
/// # Errors
/// Returns `TransportError` if the segment cannot be created or attached,
/// or if a transfer returns a different payload.
pub fn measure_shared_memory(payload: &Payload, iterations: usize) -> Result<TransferStats> {
    let config = SharedMemoryConfig {
        size: payload.len() + 1,
        key: SegmentKey::Private,
        ..SharedMemoryConfig::default()
    };
    let segment = SharedMemorySegment::create(&config)?;
    let mut writer = segment.attach()?;
    let mut reader = segment.attach()?;

    let collector = run_cycles(payload, iterations, &mut writer, &mut reader)?;
    Ok(TransferStats {
        payload_len: payload.len(),
        latency: stats_of(&collector)?,
    })
}

/// Times `iterations` write-then-read cycles through one pipe.
///
/// # Errors
/// Returns `TransportError::OutOfBounds` if the payload does not fit in
/// [`PIPE_CAPACITY`], or any pipe error.
pub fn measure_pipe(payload: &Payload, iterations: usize) -> Result<TransferStats> {
    if payload.len() > PIPE_CAPACITY {
        return Err(TransportError::out_of_bounds(payload.len(), PIPE_CAPACITY));
    }
    let (mut reader, mut writer) = pipe()?;
    let mut source = ExactReader {
        reader: &mut reader,
        len: payload.len(),
    };

    let collector = run_cycles(payload, iterations, &mut writer, &mut source)?;
    Ok(TransferStats {
        payload_len: payload.len(),
        latency: stats_of(&collector)?,
    })
}

/// Runs both measurements and compares their medians.
///
/// # Errors
/// Returns the first `TransportError` of either measurement.
pub fn compare(
    payload: &Payload,
    iterations: usize,
) -> Result<(TransferStats, TransferStats, Comparison)> {
    let shared = measure_shared_memory(payload, iterations)?;
    let piped = measure_pipe(payload, iterations)?;
    let comparison = Comparison::new(
        shared.latency.median.as_secs_f64(),
        piped.latency.median.as_secs_f64(),
    );
    Ok((shared, piped, comparison))
}

/// Pipe source that reads one payload instead of waiting for EOF.
struct ExactReader<'a> {
    reader: &'a mut ipcbench_transport::ipc::PipeReader,
    len: usize,
}

impl PayloadSource for ExactReader<'_> {
    fn read_payload(&mut self) -> Result<Vec<u8>> {
        self.reader.read_exact_len(self.len)
    }
}

fn run_cycles<W, R>(
    payload: &Payload,
    iterations: usize,
    writer: &mut W,
    reader: &mut R,
) -> Result<LatencyCollector>
where
    W: PayloadSink,
    R: PayloadSource,
{
    let mut collector = LatencyCollector::with_capacity(iterations);
    for _ in 0..iterations {
        let received = collector.measure(|| {
            writer.write_payload(payload.as_bytes())?;
            reader.read_payload()
        })?;
        if received != payload.as_bytes() {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "payload corrupted in transfer",
            )));
        }
    }
    Ok(collector)
}

fn stats_of(collector: &LatencyCollector) -> Result<LatencyStats> {
    collector.stats().ok_or_else(|| {
        TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no iterations",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipcbench_core::PayloadGenerator;

    #[test]
    fn test_measure_shared_memory() {
        let payload = PayloadGenerator::seeded(1).generate(1024);
        let stats = measure_shared_memory(&payload, 50).unwrap();
        assert_eq!(stats.payload_len, 1024);
        assert_eq!(stats.latency.count, 50);
        assert!(stats.latency.min <= stats.latency.max);
    }

    #[test]
    fn test_measure_pipe() {
        let payload = PayloadGenerator::seeded(2).generate(4096);
        let stats = measure_pipe(&payload, 50).unwrap();
        assert_eq!(stats.latency.count, 50);
        assert!(stats.bytes_per_second() >= 0.0);
    }

    #[test]
    fn test_pipe_rejects_payload_over_capacity() {
        let payload = PayloadGenerator::seeded(3).generate(PIPE_CAPACITY + 1);
        assert!(matches!(
            measure_pipe(&payload, 1),
            Err(TransportError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_zero_iterations() {
        let payload = PayloadGenerator::seeded(4).generate(16);
        assert!(measure_shared_memory(&payload, 0).is_err());
    }

    #[test]
    fn test_compare_uses_medians() {
        let payload = PayloadGenerator::seeded(5).generate(256);
        let (shared, piped, comparison) = compare(&payload, 20).unwrap();
        assert_eq!(comparison.shared_secs, shared.latency.median.as_secs_f64());
        assert_eq!(comparison.pipe_secs, piped.latency.median.as_secs_f64());
    }

    #[test]
    fn test_mb_per_second() {
        let stats = TransferStats {
            payload_len: 1024 * 1024,
            latency: LatencyStats {
                min: std::time::Duration::from_secs(1),
                max: std::time::Duration::from_secs(1),
                mean: std::time::Duration::from_secs(1),
                median: std::time::Duration::from_secs(1),
                p99: std::time::Duration::from_secs(1),
                p999: std::time::Duration::from_secs(1),
                count: 1,
            },
        };
        assert!((stats.mb_per_second() - 1.0).abs() < 0.001);
    }
}
