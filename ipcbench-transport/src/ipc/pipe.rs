//! Anonymous pipes.
//!
//! Both endpoints are created before the fork, so each process starts with
//! both. Each role drops the endpoint it does not use right away; the reader
//! only sees EOF once every copy of the write end is closed.

use crate::error::{Result, TransportError};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::os::fd::{FromRawFd, OwnedFd};

/// Creates an anonymous pipe, returning `(read_end, write_end)`.
///
/// Both descriptors are close-on-exec.
///
/// # Errors
/// Returns `TransportError::Resource` if the process or system is out of
/// file descriptors.
pub fn pipe() -> Result<(PipeReader, PipeWriter)> {
    let mut fds = [0 as libc::c_int; 2];
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if rc == -1 {
        return Err(TransportError::last_os_error("pipe2"));
    }

    // Both descriptors are freshly created and owned by nothing else.
    let (read_fd, write_fd) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    tracing::debug!("Created pipe (read fd {}, write fd {})", fds[0], fds[1]);

    Ok((
        PipeReader {
            file: File::from(read_fd),
        },
        PipeWriter {
            file: File::from(write_fd),
        },
    ))
}

/// Read end of a pipe. Closed on drop.
#[derive(Debug)]
pub struct PipeReader {
    file: File,
}

impl PipeReader {
    /// Reads until every write end is closed.
    ///
    /// # Errors
    /// Returns `TransportError::Io` if the read fails.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Reads exactly `len` bytes.
    ///
    /// # Errors
    /// Returns `TransportError::PeerClosed` if the write end closes first.
    pub fn read_exact_len(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.file.read_exact(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => TransportError::PeerClosed,
            _ => TransportError::Io(e),
        })?;
        Ok(buf)
    }
}

/// Write end of a pipe. Closed on drop.
#[derive(Debug)]
pub struct PipeWriter {
    file: File,
}

impl PipeWriter {
    /// Writes the whole payload, looping over partial writes.
    ///
    /// Blocks while the pipe buffer is full.
    ///
    /// # Errors
    /// Returns `TransportError::PeerClosed` if every read end is closed.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        self.file.write_all(payload).map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => TransportError::PeerClosed,
            _ => TransportError::Io(e),
        })
    }
}
