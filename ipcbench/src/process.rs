//! Splitting the run into a parent and a child process.

use crate::error::RunError;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Which side of a `fork` the caller is on.
#[derive(Debug)]
pub enum Fork {
    /// The original process, with a handle to the new child.
    Parent(ChildHandle),
    /// The new child process.
    Child,
}

/// Forks exactly one child.
///
/// Stdout is flushed first so the child does not inherit and repeat any
/// buffered output.
///
/// # Errors
/// Returns `RunError::ProcessCreation` if `fork` fails.
pub fn fork_process() -> Result<Fork, RunError> {
    if let Err(e) = std::io::stdout().flush() {
        tracing::warn!("Failed to flush stdout before fork: {}", e);
    }

    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(RunError::ProcessCreation(std::io::Error::last_os_error())),
        0 => Ok(Fork::Child),
        pid => {
            tracing::debug!("Forked child {}", pid);
            Ok(Fork::Parent(ChildHandle { pid }))
        }
    }
}

/// Handle to a forked child, held by the parent.
#[derive(Debug)]
pub struct ChildHandle {
    pid: libc::pid_t,
}

impl ChildHandle {
    /// Returns the child's process id.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid as u32
    }

    /// Blocks until the child exits and returns its status.
    ///
    /// # Errors
    /// Returns `RunError::Wait` if `waitpid` fails.
    pub fn wait(self) -> Result<ExitStatus, RunError> {
        let mut status: libc::c_int = 0;
        loop {
            let rc = unsafe { libc::waitpid(self.pid, &mut status, 0) };
            if rc != -1 {
                break;
            }
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                return Err(RunError::Wait {
                    pid: self.pid(),
                    source: err,
                });
            }
        }

        let status = ExitStatus::from_raw(status);
        tracing::debug!("Child {} exited with {}", self.pid, status);
        Ok(status)
    }

    /// Waits for the child and fails unless it exited successfully.
    ///
    /// # Errors
    /// Returns `RunError::ChildFailed` on a non-zero exit or a signal.
    pub fn join(self) -> Result<(), RunError> {
        let pid = self.pid();
        let status = self.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(RunError::ChildFailed { pid, status })
        }
    }
}
