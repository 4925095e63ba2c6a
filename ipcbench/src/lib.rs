//! # ipcbench
//!
//! Compares System V shared memory against an anonymous pipe by forking one
//! child and moving the same random payload through both.
//!
//! ## Flow
//!
//! 1. The parent creates the shared memory segment, the payload pipe and a
//!    ready signal, then forks.
//! 2. The parent writes the payload to shared memory (timed), signals the
//!    child, then writes the payload to the pipe (timed).
//! 3. The child waits for the signal, reads shared memory (timed) and drains
//!    the pipe.
//! 4. The parent prints the comparison, reaps the child and releases the
//!    segment.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ipcbench::prelude::*;
//!
//! let config = BenchConfig::default().payload_len(4096).seed(7);
//! match Runner::new(config).run()? {
//!     Outcome::Parent(summary) => println!("{}", summary.comparison().verdict()),
//!     Outcome::Child => {}
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Payload generation, timing samples, comparison
//! - [`transport`] - Shared memory, pipes, ready signal

pub mod config;
pub mod error;
pub mod prelude;
pub mod process;
pub mod role;
pub mod runner;

/// Payload generation, timing and comparison.
pub mod core {
    pub use ipcbench_core::*;
}

/// Shared memory and pipe channels.
pub mod transport {
    pub use ipcbench_transport::*;
}

pub use config::{BenchConfig, Cli};
pub use error::RunError;
pub use process::{ChildHandle, Fork, fork_process};
pub use role::{ReceiverReport, SenderReport, receive, send};
pub use runner::{Outcome, RunSummary, Runner};
