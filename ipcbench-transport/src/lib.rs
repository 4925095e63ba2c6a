//! # ipcbench Transport
//!
//! The two channels the benchmark compares, plus the signal that orders them.
//!
//! This crate provides:
//! - [`ipc::shm`] - System V shared memory segments with scoped release
//! - [`ipc::pipe`] - Anonymous pipes with half-close endpoints
//! - [`ipc::signal`] - One-shot ready signal between the two processes
//! - [`channel`] - Traits the process roles use to write and read payloads

pub mod channel;
pub mod error;
pub mod ipc;

pub use channel::{PayloadSink, PayloadSource};
pub use error::{Result, TransportError};
