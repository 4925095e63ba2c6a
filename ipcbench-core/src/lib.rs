//! # ipcbench Core
//!
//! Core types for the shared memory vs. pipe IPC benchmark.
//!
//! This crate provides:
//! - Random alphanumeric payload generation with an explicit RNG instance
//! - Monotonic timing samples for a single bounded transfer
//! - Comparison of two timings and the console lines reporting it

pub mod payload;
pub mod report;
pub mod timing;

pub use payload::{CHARSET, Payload, PayloadGenerator};
pub use report::{ChannelKind, Comparison, Role, RoleReporter, Verdict};
pub use timing::{TimedTransfer, TimingSample};
