//! Run configuration and command line.

use crate::error::RunError;
use clap::Parser;
use ipcbench_transport::TransportError;
use ipcbench_transport::ipc::{SegmentKey, SharedMemoryConfig};
use std::path::PathBuf;

/// Configuration of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Payload length in bytes.
    pub payload_len: usize,
    /// Shared memory segment settings.
    pub shm: SharedMemoryConfig,
    /// Payload RNG seed; OS entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            payload_len: 1024,
            shm: SharedMemoryConfig::default(),
            seed: None,
        }
    }
}

impl BenchConfig {
    /// Sets the payload length.
    #[must_use]
    pub fn payload_len(mut self, len: usize) -> Self {
        self.payload_len = len;
        self
    }

    /// Sets the shared memory segment size.
    #[must_use]
    pub fn segment_size(mut self, size: usize) -> Self {
        self.shm.size = size;
        self
    }

    /// Sets the shared memory key.
    #[must_use]
    pub fn key(mut self, key: SegmentKey) -> Self {
        self.shm.key = key;
        self
    }

    /// Sets the payload RNG seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the payload fits in the segment.
    ///
    /// # Errors
    /// Returns `RunError::InvalidConfig` wrapping an out-of-bounds error if
    /// the payload is larger than the segment.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.payload_len > self.shm.size {
            return Err(RunError::InvalidConfig(TransportError::out_of_bounds(
                self.payload_len,
                self.shm.size,
            )));
        }
        Ok(())
    }
}

/// Command line of the `ipcbench` binary. Every flag is optional.
#[derive(Debug, Parser)]
#[command(
    name = "ipcbench",
    version,
    about = "Times a payload through System V shared memory and a pipe across a fork"
)]
pub struct Cli {
    /// Payload length in bytes.
    #[arg(long, default_value_t = 1024)]
    pub payload_len: usize,

    /// Shared memory segment size in bytes.
    #[arg(long, default_value_t = 1024 * 1024)]
    pub segment_size: usize,

    /// Existing path the segment key is derived from.
    #[arg(long, default_value = "/tmp")]
    pub key_path: PathBuf,

    /// Project token the segment key is derived from.
    #[arg(long, default_value = "X", value_parser = parse_proj_id)]
    pub proj_id: u8,

    /// Use a private segment instead of the path-derived key.
    #[arg(long)]
    pub private: bool,

    /// Seed for the payload generator.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Builds the run configuration.
    #[must_use]
    pub fn into_config(self) -> BenchConfig {
        let key = if self.private {
            SegmentKey::Private
        } else {
            SegmentKey::Path {
                path: self.key_path,
                proj_id: self.proj_id,
            }
        };

        let config = BenchConfig::default()
            .payload_len(self.payload_len)
            .segment_size(self.segment_size)
            .key(key);

        match self.seed {
            Some(seed) => config.seed(seed),
            None => config,
        }
    }
}

fn parse_proj_id(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if *b != 0 && b.is_ascii() => Ok(*b),
        _ => Err(format!("expected a single non-NUL ASCII character, got {s:?}")),
    }
}
