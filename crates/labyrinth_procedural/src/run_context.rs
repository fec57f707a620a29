//! # Run Context
//!
//! Run-wide generation state passed explicitly into every generation call:
//! the seed base, the chunk counter and the "chunks cleared" counter.

use rand::Rng;

use crate::rng::{ChunkSeed, MazeRng};

/// Seed and sequence number reserved for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkTicket {
    /// Chunk sequence number.
    pub index: u64,
    /// Chunk seed (`"<base>-<index>"`).
    pub seed: ChunkSeed,
}

impl ChunkTicket {
    /// Deterministic stream for a named sub-purpose of this chunk.
    #[must_use]
    pub fn rng(&self, purpose: &str) -> MazeRng {
        MazeRng::from_seed(&self.seed.derive(purpose))
    }
}

/// Per-run generation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunContext {
    seed_base: String,
    next_index: u64,
    cleared: u32,
}

impl RunContext {
    /// Starts a run from a fixed seed base. Same base, same run.
    #[must_use]
    pub fn new(seed_base: impl Into<String>) -> Self {
        Self {
            seed_base: seed_base.into(),
            next_index: 0,
            cleared: 0,
        }
    }

    /// Starts a run from a fresh random seed base.
    #[must_use]
    pub fn random() -> Self {
        let value: u64 = rand::thread_rng().gen();
        Self::new(format!("{value:016x}"))
    }

    /// Seed base of this run.
    #[inline]
    #[must_use]
    pub fn seed_base(&self) -> &str {
        &self.seed_base
    }

    /// Chunks cleared so far.
    #[inline]
    #[must_use]
    pub const fn cleared(&self) -> u32 {
        self.cleared
    }

    /// Number of chunks created so far.
    #[inline]
    #[must_use]
    pub const fn chunks_created(&self) -> u64 {
        self.next_index
    }

    /// Reserves the next chunk index and seed.
    pub fn next_ticket(&mut self) -> ChunkTicket {
        let index = self.next_index;
        self.next_index += 1;
        ChunkTicket {
            index,
            seed: ChunkSeed::new(format!("{}-{index}", self.seed_base)),
        }
    }

    /// Records a cleared chunk and returns the new count.
    pub fn record_clear(&mut self) -> u32 {
        self.cleared += 1;
        self.cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_are_sequential() {
        let mut ctx = RunContext::new("base");
        let a = ctx.next_ticket();
        let b = ctx.next_ticket();
        assert_eq!((a.index, a.seed.as_str()), (0, "base-0"));
        assert_eq!((b.index, b.seed.as_str()), (1, "base-1"));
        assert_eq!(ctx.chunks_created(), 2);
    }

    #[test]
    fn test_independent_contexts() {
        let mut one = RunContext::new("same");
        let mut two = RunContext::new("same");
        one.next_ticket();
        assert_eq!(one.record_clear(), 1);
        assert_eq!(two.cleared(), 0);
        assert_eq!(two.next_ticket().index, 0);
    }

    #[test]
    fn test_random_bases_differ() {
        let a = RunContext::random();
        let b = RunContext::random();
        assert_eq!(a.seed_base().len(), 16);
        assert_ne!(a.seed_base(), b.seed_base());
    }
}
