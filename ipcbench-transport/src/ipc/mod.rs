//! IPC (Inter-Process Communication) channels.
//!
//! Provides System V shared memory and anonymous pipes, both meant to be
//! created before a `fork` and used from the two resulting processes.

pub mod pipe;
pub mod shm;
pub mod signal;

pub use pipe::{PipeReader, PipeWriter, pipe};
pub use shm::{SegmentKey, SharedMemoryConfig, SharedMemorySegment, ShmAttachment};
pub use signal::{ReadyNotifier, ReadyWaiter, ready_signal};
