//! Random alphanumeric payloads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Alphabet payload characters are drawn from.
pub const CHARSET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Immutable payload transferred through every channel of a run.
///
/// Always ASCII, so the bytes are valid UTF-8 as well.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Box<[u8]>,
}

impl Payload {
    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the raw payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the payload as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only CHARSET bytes are ever stored.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload").field("len", &self.len()).finish()
    }
}

/// Generates fixed-length payloads from [`CHARSET`].
///
/// The generator owns its RNG, so two generators built from the same seed
/// produce the same sequence of payloads.
pub struct PayloadGenerator<R = StdRng> {
    rng: R,
}

impl PayloadGenerator<StdRng> {
    /// Creates a generator with a deterministic seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> PayloadGenerator<R> {
    /// Creates a generator around an existing RNG.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generates a payload of `len` characters, drawn uniformly with
    /// replacement from [`CHARSET`].
    pub fn generate(&mut self, len: usize) -> Payload {
        let bytes = (0..len)
            .map(|_| CHARSET[self.rng.gen_range(0..CHARSET.len())])
            .collect();
        Payload { bytes }
    }
}
