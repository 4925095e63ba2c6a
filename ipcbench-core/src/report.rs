//! Comparison of shared memory and pipe timings, and the console lines of a
//! run.
//!
//! Every timing is printed in seconds with six decimals.

use std::cmp::Ordering;
use std::fmt;

/// Process role a console line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Forking process; writes both channels and compares timings.
    Parent,
    /// Forked process; reads the shared memory segment.
    Child,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => f.write_str("Parent"),
            Self::Child => f.write_str("Child"),
        }
    }
}

/// Channel a console line is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// System V shared memory segment.
    SharedMemory,
    /// Anonymous pipe.
    Pipe,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedMemory => f.write_str("shared memory"),
            Self::Pipe => f.write_str("pipe"),
        }
    }
}

/// Formats console lines for one process.
#[derive(Debug, Clone, Copy)]
pub struct RoleReporter {
    role: Role,
    pid: u32,
}

impl RoleReporter {
    /// Creates a reporter for `role` running as `pid`.
    #[must_use]
    pub fn new(role: Role, pid: u32) -> Self {
        Self { role, pid }
    }

    /// Line announcing the process start.
    #[must_use]
    pub fn started(&self) -> String {
        match self.role {
            Role::Parent => format!("{}: Process started.", self.prefix()),
            Role::Child => format!("{}: Process started (with shared memory).", self.prefix()),
        }
    }

    /// Line reporting the number of bytes received over `channel`.
    #[must_use]
    pub fn received(&self, channel: ChannelKind, len: usize) -> String {
        format!("{}: Received Value ({}) = {} bytes", self.prefix(), channel, len)
    }

    /// Line reporting the number of bytes sent over `channel`.
    #[must_use]
    pub fn sent(&self, channel: ChannelKind, len: usize) -> String {
        format!("{}: Sent Value ({}) = {} bytes", self.prefix(), channel, len)
    }

    /// Line reporting the time a transfer over `channel` took.
    #[must_use]
    pub fn time_taken(&self, channel: ChannelKind, secs: f64) -> String {
        format!(
            "{}: Time taken for IPC ({}) = {:.6} seconds",
            self.prefix(),
            channel,
            secs
        )
    }

    fn prefix(&self) -> String {
        format!("{} (PID {})", self.role, self.pid)
    }
}

/// Which channel won the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Shared memory took less time than the pipe.
    SharedFaster,
    /// The pipe took less time than shared memory.
    PipeFaster,
    /// Both took exactly the same time.
    Tie,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedFaster => f.write_str("SHARED WAS FASTER"),
            Self::PipeFaster => f.write_str("NON-SHARED WAS FASTER"),
            Self::Tie => f.write_str("SHARED AND NON-SHARED TOOK THE SAME TIME"),
        }
    }
}

/// Shared memory timing compared against pipe timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Shared memory transfer time in seconds.
    pub shared_secs: f64,
    /// Pipe transfer time in seconds.
    pub pipe_secs: f64,
}

impl Comparison {
    /// Creates a comparison of two elapsed times in seconds.
    #[must_use]
    pub fn new(shared_secs: f64, pipe_secs: f64) -> Self {
        Self {
            shared_secs,
            pipe_secs,
        }
    }

    /// Returns `shared - pipe` in seconds.
    #[must_use]
    pub fn difference(&self) -> f64 {
        self.shared_secs - self.pipe_secs
    }

    /// Classifies the difference.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match self.difference().partial_cmp(&0.0) {
            Some(Ordering::Less) => Verdict::SharedFaster,
            Some(Ordering::Greater) => Verdict::PipeFaster,
            // NaN cannot come from two finite durations.
            Some(Ordering::Equal) | None => Verdict::Tie,
        }
    }

    /// Line reporting the time difference.
    #[must_use]
    pub fn difference_line(&self) -> String {
        format!(
            "Time Difference (Shared Memory - Pipe) = {:.6} seconds",
            self.difference()
        )
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.difference_line())?;
        write!(f, "{}", self.verdict())
    }
}
