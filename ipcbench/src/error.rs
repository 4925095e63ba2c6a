//! Error types for a benchmark run.

use ipcbench_transport::TransportError;
use std::process::ExitStatus;
use thiserror::Error;

/// Error type for a benchmark run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum RunError {
    /// A pipe or shared memory segment could not be created.
    #[error("{resource} creation failed: {source}")]
    ResourceCreation {
        /// Resource being created.
        resource: &'static str,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// `fork` failed.
    #[error("Fork failed: {0}")]
    ProcessCreation(#[source] std::io::Error),

    /// The configuration cannot produce a valid run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[source] TransportError),

    /// A transfer over one of the channels failed.
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransportError),

    /// Waiting for the child failed.
    #[error("waiting for child {pid} failed: {source}")]
    Wait {
        /// Child process id.
        pid: u32,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The child exited unsuccessfully.
    #[error("child {pid} exited with {status}")]
    ChildFailed {
        /// Child process id.
        pid: u32,
        /// Exit status reported by `waitpid`.
        status: ExitStatus,
    },

    /// The two channels delivered different payloads.
    #[error("payload mismatch: {shared} bytes over shared memory, {pipe} bytes over pipe")]
    PayloadMismatch {
        /// Bytes received over shared memory.
        shared: usize,
        /// Bytes received over the pipe.
        pipe: usize,
    },
}

impl RunError {
    /// Creates a resource creation error.
    pub fn resource(resource: &'static str, source: TransportError) -> Self {
        Self::ResourceCreation { resource, source }
    }
}
