//! The two sides of a run.
//!
//! Both roles are generic over the channel traits and only need the ready
//! signal to be shared with the other side. They can run in one process,
//! sender first, as long as the pipe buffer holds the whole payload.

use crate::error::RunError;
use ipcbench_core::{Comparison, Payload, TimedTransfer, TimingSample};
use ipcbench_transport::ipc::{ReadyNotifier, ReadyWaiter};
use ipcbench_transport::{PayloadSink, PayloadSource};

/// What the sending side measured.
#[derive(Debug, Clone, Copy)]
pub struct SenderReport {
    /// Bytes written to each channel.
    pub sent: usize,
    /// Time to write the payload into shared memory.
    pub shared_memory: TimingSample,
    /// Time to write the payload into the pipe.
    pub pipe: TimingSample,
}

impl SenderReport {
    /// Compares the shared memory write against the pipe write.
    #[must_use]
    pub fn comparison(&self) -> Comparison {
        Comparison::new(self.shared_memory.as_secs_f64(), self.pipe.as_secs_f64())
    }
}

/// What the receiving side measured and got.
#[derive(Debug, Clone)]
pub struct ReceiverReport {
    /// Time to read the payload out of shared memory.
    pub shared_memory: TimingSample,
    /// Payload read from shared memory.
    pub shared_payload: Vec<u8>,
    /// Payload read from the pipe.
    pub pipe_payload: Vec<u8>,
}

/// Sends `payload` through shared memory, then through the pipe.
///
/// The ready signal fires between the two writes, after the shared memory
/// write has completed. The pipe is closed once written so the receiver
/// sees EOF.
///
/// # Errors
/// Returns `RunError::Transfer` if either write or the signal fails.
pub fn send<S, P>(
    payload: &Payload,
    shm: &mut S,
    ready: ReadyNotifier,
    mut pipe: P,
) -> Result<SenderReport, RunError>
where
    S: PayloadSink,
    P: PayloadSink,
{
    let (written, shared_memory) = TimedTransfer::run(|| shm.write_payload(payload.as_bytes()));
    written?;
    ready.notify()?;

    let (written, pipe_sample) = TimedTransfer::run(|| pipe.write_payload(payload.as_bytes()));
    written?;
    pipe.close();

    tracing::debug!(
        "Sent {} bytes (shm {:?}, pipe {:?})",
        payload.len(),
        shared_memory.elapsed(),
        pipe_sample.elapsed()
    );

    Ok(SenderReport {
        sent: payload.len(),
        shared_memory,
        pipe: pipe_sample,
    })
}

/// Receives the payload from shared memory, then drains the pipe.
///
/// Only the shared memory read is timed; waiting for the sender is not.
///
/// # Errors
/// Returns `RunError::Transfer` if the sender never signals or a read
/// fails, and `RunError::PayloadMismatch` if the channels disagree.
pub fn receive<S, P>(
    shm: &mut S,
    ready: ReadyWaiter,
    pipe: &mut P,
) -> Result<ReceiverReport, RunError>
where
    S: PayloadSource,
    P: PayloadSource,
{
    ready.wait()?;

    let (read, shared_memory) = TimedTransfer::run(|| shm.read_payload());
    let shared_payload = read?;
    let pipe_payload = pipe.read_payload()?;

    if shared_payload != pipe_payload {
        return Err(RunError::PayloadMismatch {
            shared: shared_payload.len(),
            pipe: pipe_payload.len(),
        });
    }

    Ok(ReceiverReport {
        shared_memory,
        shared_payload,
        pipe_payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipcbench_core::PayloadGenerator;
    use ipcbench_transport::TransportError;
    use ipcbench_transport::ipc::{
        SegmentKey, SharedMemoryConfig, SharedMemorySegment, pipe, ready_signal,
    };

    fn private_segment(size: usize) -> SharedMemorySegment {
        SharedMemorySegment::create(&SharedMemoryConfig {
            size,
            key: SegmentKey::Private,
            ..SharedMemoryConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_send_then_receive_in_process() {
        let segment = private_segment(4096);
        let mut parent_shm = segment.attach().unwrap();
        let mut child_shm = segment.attach().unwrap();
        let (mut pipe_reader, pipe_writer) = pipe().unwrap();
        let (notifier, waiter) = ready_signal().unwrap();

        let payload = PayloadGenerator::seeded(11).generate(1024);

        let sent = send(&payload, &mut parent_shm, notifier, pipe_writer).unwrap();
        assert_eq!(sent.sent, 1024);

        let received = receive(&mut child_shm, waiter, &mut pipe_reader).unwrap();
        assert_eq!(received.shared_payload, payload.as_bytes());
        assert_eq!(received.pipe_payload, payload.as_bytes());
    }

    #[test]
    fn test_sender_comparison_matches_samples() {
        let segment = private_segment(4096);
        let mut shm = segment.attach().unwrap();
        let (_reader, writer) = pipe().unwrap();
        let (notifier, _waiter) = ready_signal().unwrap();

        let payload = PayloadGenerator::seeded(3).generate(512);
        let report = send(&payload, &mut shm, notifier, writer).unwrap();

        let cmp = report.comparison();
        assert_eq!(cmp.shared_secs, report.shared_memory.as_secs_f64());
        assert_eq!(cmp.pipe_secs, report.pipe.as_secs_f64());
    }

    #[test]
    fn test_oversized_payload_never_signals() {
        let segment = private_segment(64);
        let mut parent_shm = segment.attach().unwrap();
        let mut child_shm = segment.attach().unwrap();
        let (mut pipe_reader, pipe_writer) = pipe().unwrap();
        let (notifier, waiter) = ready_signal().unwrap();

        let payload = PayloadGenerator::seeded(1).generate(65);
        let err = send(&payload, &mut parent_shm, notifier, pipe_writer).unwrap_err();
        assert!(matches!(
            err,
            RunError::Transfer(TransportError::OutOfBounds {
                len: 65,
                capacity: 64
            })
        ));

        // The notifier was dropped unsignalled, so the receiver bails out
        // instead of reading a stale region.
        let err = receive(&mut child_shm, waiter, &mut pipe_reader).unwrap_err();
        assert!(matches!(err, RunError::Transfer(TransportError::PeerClosed)));
    }

    #[test]
    fn test_receive_detects_mismatch() {
        let segment = private_segment(64);
        let mut shm = segment.attach().unwrap();
        shm.write(b"from shared memory").unwrap();

        let (mut pipe_reader, mut pipe_writer) = pipe().unwrap();
        pipe_writer.write(b"from the pipe").unwrap();
        drop(pipe_writer);

        let (notifier, waiter) = ready_signal().unwrap();
        notifier.notify().unwrap();

        let err = receive(&mut shm, waiter, &mut pipe_reader).unwrap_err();
        assert!(matches!(
            err,
            RunError::PayloadMismatch {
                shared: 18,
                pipe: 13
            }
        ));
    }
}
