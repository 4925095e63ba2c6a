//! Prelude module for convenient imports.
//!
//! ```ignore
//! use ipcbench::prelude::*;
//! ```

pub use ipcbench_core::{Comparison, Payload, PayloadGenerator, TimedTransfer, TimingSample, Verdict};
pub use ipcbench_transport::ipc::{SegmentKey, SharedMemoryConfig, SharedMemorySegment};
pub use ipcbench_transport::{PayloadSink, PayloadSource, TransportError};

pub use crate::config::BenchConfig;
pub use crate::error::RunError;
pub use crate::runner::{Outcome, RunSummary, Runner};
