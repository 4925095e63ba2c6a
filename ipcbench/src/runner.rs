//! One full benchmark run across a fork.

use crate::config::BenchConfig;
use crate::error::RunError;
use crate::process::{ChildHandle, Fork, fork_process};
use crate::role::{SenderReport, receive, send};
use ipcbench_core::{ChannelKind, Comparison, PayloadGenerator, Role, RoleReporter};
use ipcbench_transport::ipc::{
    PipeReader, PipeWriter, ReadyNotifier, ReadyWaiter, SharedMemorySegment, pipe, ready_signal,
};

/// Which process a run returned in.
#[derive(Debug)]
pub enum Outcome {
    /// The parent, after the child exited and the segment was released.
    Parent(RunSummary),
    /// The child, after it received both payloads.
    Child,
}

/// Results of a run, as seen by the parent.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Child process id.
    pub child_pid: u32,
    /// Sender-side timings.
    pub sender: SenderReport,
}

impl RunSummary {
    /// Compares the shared memory write against the pipe write.
    #[must_use]
    pub fn comparison(&self) -> Comparison {
        self.sender.comparison()
    }
}

/// Runs the benchmark.
pub struct Runner {
    config: BenchConfig,
}

impl Runner {
    /// Creates a runner for `config`.
    #[must_use]
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    /// Creates both channels, forks, and runs each role on its side.
    ///
    /// Returns in both processes. The caller should exit after it.
    ///
    /// # Errors
    /// Returns `RunError` if a resource cannot be created, the fork fails,
    /// a transfer fails, or (in the parent) the child fails. Resources
    /// created before the failure are released.
    pub fn run(&self) -> Result<Outcome, RunError> {
        self.config.validate()?;

        let parent = RoleReporter::new(Role::Parent, std::process::id());
        println!("{}", parent.started());

        let mut segment = SharedMemorySegment::create(&self.config.shm)
            .map_err(|e| RunError::resource("Shared memory", e))?;
        let (pipe_reader, pipe_writer) = pipe().map_err(|e| RunError::resource("Pipe", e))?;
        let (notifier, waiter) = ready_signal().map_err(|e| RunError::resource("Pipe", e))?;

        match fork_process()? {
            Fork::Child => {
                segment.disown();
                // Half-close: the child only reads.
                drop(pipe_writer);
                drop(notifier);
                run_child(&segment, waiter, pipe_reader)?;
                Ok(Outcome::Child)
            }
            Fork::Parent(child) => {
                // Half-close: the parent only writes.
                drop(pipe_reader);
                drop(waiter);
                let summary = self.run_parent(&parent, &segment, notifier, pipe_writer, child)?;
                segment.destroy()?;
                Ok(Outcome::Parent(summary))
            }
        }
    }

    fn run_parent(
        &self,
        reporter: &RoleReporter,
        segment: &SharedMemorySegment,
        notifier: ReadyNotifier,
        pipe_writer: PipeWriter,
        child: ChildHandle,
    ) -> Result<RunSummary, RunError> {
        let child_pid = child.pid();
        let sent = self.send_payload(segment, notifier, pipe_writer);
        if let Ok(sender) = &sent {
            tracing::debug!(
                "Parent wrote {} bytes to shared memory in {:.6} seconds",
                sender.sent,
                sender.shared_memory.as_secs_f64()
            );
            println!("{}", reporter.sent(ChannelKind::Pipe, sender.sent));
            println!(
                "{}",
                reporter.time_taken(ChannelKind::Pipe, sender.pipe.as_secs_f64())
            );
            println!("{}", sender.comparison());
        }

        // Reap the child even if sending failed, so the segment is only
        // released after its last use.
        let joined = child.join();
        let sender = sent?;
        joined?;

        Ok(RunSummary { child_pid, sender })
    }

    fn send_payload(
        &self,
        segment: &SharedMemorySegment,
        notifier: ReadyNotifier,
        pipe_writer: PipeWriter,
    ) -> Result<SenderReport, RunError> {
        // On failure the notifier and pipe are dropped here, which unblocks
        // the child before the parent waits for it.
        let mut shm = segment.attach()?;
        let mut generator = match self.config.seed {
            Some(seed) => PayloadGenerator::seeded(seed),
            None => PayloadGenerator::from_entropy(),
        };
        let payload = generator.generate(self.config.payload_len);
        send(&payload, &mut shm, notifier, pipe_writer)
    }
}

fn run_child(
    segment: &SharedMemorySegment,
    waiter: ReadyWaiter,
    mut pipe_reader: PipeReader,
) -> Result<(), RunError> {
    let reporter = RoleReporter::new(Role::Child, std::process::id());
    println!("{}", reporter.started());

    let mut shm = segment.attach()?;
    let received = receive(&mut shm, waiter, &mut pipe_reader)?;

    println!(
        "{}",
        reporter.received(ChannelKind::SharedMemory, received.shared_payload.len())
    );
    println!(
        "{}",
        reporter.time_taken(
            ChannelKind::SharedMemory,
            received.shared_memory.as_secs_f64()
        )
    );
    println!(
        "{}",
        reporter.received(ChannelKind::Pipe, received.pipe_payload.len())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipcbench_transport::TransportError;

    #[test]
    fn test_runner_rejects_oversized_payload_before_forking() {
        let config = BenchConfig::default().payload_len(2048).segment_size(1024);
        let runner = Runner::new(config);
        assert!(matches!(
            runner.run(),
            Err(RunError::InvalidConfig(TransportError::OutOfBounds { .. }))
        ));
    }
}
