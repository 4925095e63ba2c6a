//! # ipcbench Bench
//!
//! Repeated shared memory and pipe transfers within one process, for
//! numbers more stable than the single cross-process run.

pub mod latency;
pub mod transfer;
