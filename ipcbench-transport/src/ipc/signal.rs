//! One-shot ready signal between the two processes.
//!
//! Shared memory has no handshake of its own. The writer calls
//! [`ReadyNotifier::notify`] after its write and the reader blocks in
//! [`ReadyWaiter::wait`] before reading, which orders the two.

use crate::error::Result;
use crate::ipc::pipe::{PipeReader, PipeWriter, pipe};

const READY: u8 = b'R';

/// Creates a ready signal, returning `(notifier, waiter)`.
///
/// # Errors
/// Returns `TransportError::Resource` if the underlying pipe cannot be
/// created.
pub fn ready_signal() -> Result<(ReadyNotifier, ReadyWaiter)> {
    let (reader, writer) = pipe()?;
    Ok((ReadyNotifier { writer }, ReadyWaiter { reader }))
}

/// Sending side of a ready signal.
#[derive(Debug)]
pub struct ReadyNotifier {
    writer: PipeWriter,
}

impl ReadyNotifier {
    /// Signals the waiter. Consumes the notifier, closing its end.
    ///
    /// # Errors
    /// Returns `TransportError::PeerClosed` if the waiter is gone.
    pub fn notify(mut self) -> Result<()> {
        self.writer.write(&[READY])
    }
}

/// Receiving side of a ready signal.
#[derive(Debug)]
pub struct ReadyWaiter {
    reader: PipeReader,
}

impl ReadyWaiter {
    /// Blocks until the notifier signals.
    ///
    /// # Errors
    /// Returns `TransportError::PeerClosed` if the notifier is dropped
    /// without signalling.
    pub fn wait(mut self) -> Result<()> {
        let byte = self.reader.read_exact_len(1)?;
        debug_assert_eq!(byte, [READY]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    #[test]
    fn test_notify_then_wait() {
        let (notifier, waiter) = ready_signal().unwrap();
        notifier.notify().unwrap();
        waiter.wait().unwrap();
    }

    #[test]
    fn test_wait_blocks_until_notified() {
        let (notifier, waiter) = ready_signal().unwrap();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            notifier.notify().unwrap();
        });

        waiter.wait().unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_dropped_notifier() {
        let (notifier, waiter) = ready_signal().unwrap();
        drop(notifier);

        assert!(matches!(waiter.wait(), Err(TransportError::PeerClosed)));
    }

    #[test]
    fn test_dropped_waiter() {
        let (notifier, waiter) = ready_signal().unwrap();
        drop(waiter);

        assert!(matches!(notifier.notify(), Err(TransportError::PeerClosed)));
    }
}
