//! Error types for IPC channel operations.

use thiserror::Error;

/// Error type for IPC channel operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A system IPC resource could not be created, attached or released.
    #[error("{op} failed: {source}")]
    Resource {
        /// System call or operation that failed.
        op: &'static str,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Payload does not fit in the shared memory region.
    #[error("payload of {len} bytes exceeds region of {capacity} bytes")]
    OutOfBounds {
        /// Payload length in bytes.
        len: usize,
        /// Region size in bytes.
        capacity: usize,
    },

    /// The segment was already destroyed through this handle.
    #[error("shared memory segment {id} already destroyed")]
    AlreadyDestroyed {
        /// Segment identifier.
        id: i32,
    },

    /// The other side closed its endpoint before the expected data arrived.
    #[error("peer closed the channel")]
    PeerClosed,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Creates a resource error from the current `errno`.
    pub fn last_os_error(op: &'static str) -> Self {
        Self::Resource {
            op,
            source: std::io::Error::last_os_error(),
        }
    }

    /// Creates an out-of-bounds error.
    pub fn out_of_bounds(len: usize, capacity: usize) -> Self {
        Self::OutOfBounds { len, capacity }
    }
}

/// Result type alias for IPC channel operations.
pub type Result<T> = std::result::Result<T, TransportError>;
