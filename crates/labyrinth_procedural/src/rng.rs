//! # Maze RNG
//!
//! Small, fast, deterministic pseudo-random stream for chunk generation.
//!
//! ## Determinism Guarantee
//!
//! Given the same `ChunkSeed`, `MazeRng` produces **exactly** the same
//! sequence on any platform. String seeds are hashed with 32-bit FNV-1a over
//! their UTF-16 code units; the stream itself is a 32-bit linear congruential
//! generator. Not cryptographic, never will be.

use std::fmt;

use rand::RngCore;

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 16_777_619;

/// LCG multiplier (Numerical Recipes).
const LCG_MUL: u32 = 1_664_525;

/// LCG increment (Numerical Recipes).
const LCG_INC: u32 = 1_013_904_223;

/// Suffix appended to a seed for each regeneration attempt.
pub const RETRY_SALT: &str = "_retry";

/// String seed for one chunk (e.g. `"k3v9q-4"`).
///
/// Chunk seeds are strings so that run base, chunk number and retry salt
/// compose by plain concatenation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkSeed(String);

impl ChunkSeed {
    /// Creates a chunk seed from any string.
    #[inline]
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// Returns the raw seed string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the seed for the next regeneration attempt.
    #[must_use]
    pub fn salted(&self) -> Self {
        Self(format!("{}{RETRY_SALT}", self.0))
    }

    /// Derives an independent sub-seed for a specific purpose
    /// (e.g. `"hazards"`, `"shape"`).
    #[must_use]
    pub fn derive(&self, purpose: &str) -> Self {
        Self(format!("{}:{purpose}", self.0))
    }

    /// Hashes the seed string into a 32-bit LCG state.
    #[must_use]
    pub fn hash32(&self) -> u32 {
        self.0.encode_utf16().fold(FNV_OFFSET, |hash, unit| {
            (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
        })
    }
}

impl fmt::Display for ChunkSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChunkSeed {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Deterministic 32-bit LCG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeRng {
    state: u32,
}

impl MazeRng {
    /// Creates a generator from a numeric seed, used directly as state.
    #[inline]
    #[must_use]
    pub const fn from_u32(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a generator from a string seed.
    #[inline]
    #[must_use]
    pub fn from_seed(seed: &ChunkSeed) -> Self {
        Self::from_u32(seed.hash32())
    }

    /// Advances the stream and returns the new 32-bit state.
    #[inline]
    pub fn next_state(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.state
    }

    /// Returns a float in `[0, 1)`.
    #[inline]
    pub fn next_float(&mut self) -> f64 {
        f64::from(self.next_state()) / 4_294_967_296.0
    }

    /// Returns an integer in `[0, max)`. Returns 0 when `max` is 0.
    #[inline]
    pub fn next_int(&mut self, max: usize) -> usize {
        if max == 0 {
            self.next_state();
            return 0;
        }
        scale(self.next_state(), max)
    }

    /// Returns an integer in `[low, high]` inclusive.
    #[inline]
    pub fn next_range(&mut self, low: usize, high: usize) -> usize {
        low + self.next_int(high.saturating_sub(low) + 1)
    }

    /// Returns `true` with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_float() < probability
    }
}

/// Fixed-point `floor(value / 2^32 * max)`; never reaches `max`.
#[inline]
fn scale(value: u32, max: usize) -> usize {
    ((u64::from(value) * max as u64) >> 32) as usize
}

impl RngCore for MazeRng {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_state());
        let low = u64::from(self.next_state());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_state().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
