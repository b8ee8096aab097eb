//! Seeded random stream shared by every subsystem.
//!
//! A single [`GameRng`] is created per match and threaded through terrain
//! generation, base placement, combat rolls, and AI decisions. Two matches
//! with the same seed and the same command sequence consume the stream
//! identically and produce identical state.

use serde::{Deserialize, Serialize};

/// Deterministic linear congruential generator.
///
/// Not cryptographic and not statistically strong; it only needs to be
/// fast, portable, and bit-exact across platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new stream from a match seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Raw stream state, for inclusion in determinism hashes.
    #[must_use]
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance the stream and return the next raw value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    /// Draw a value in `0..n`. Returns 0 when `n` is 0.
    pub fn next_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.next_u64() % n
    }

    /// One-in-`n` event. Returns false when `n` is 0.
    pub fn chance(&mut self, n: u64) -> bool {
        n != 0 && self.next_below(n) == 0
    }

    /// Combat die: a value in `1..=16`.
    pub fn combat_roll(&mut self) -> u32 {
        let roll = self.next_below(16) as u32;
        roll + 1
    }
}
