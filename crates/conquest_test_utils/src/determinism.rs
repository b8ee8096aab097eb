//! Determinism testing utilities.
//!
//! The simulation must produce identical results given identical inputs.
//! Sources of non-determinism to watch for:
//!
//! - **System randomness**: every draw comes from the match's single
//!   seeded stream; nothing may call `rand()` or hash-randomized
//!   collections for draws.
//! - **Iteration order**: bases and players are processed in id order,
//!   never via `HashMap` iteration.
//! - **Wall-clock time**: the caller supplies elapsed seconds; the core
//!   never reads a clock.
//!
//! Floating-point garrison math is deterministic on a single host for a
//! fixed tick sequence, which is the guarantee these tools verify.

use std::thread;

use conquest_core::game::{Game, GameConfig};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// All unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic.
    ///
    /// # Panics
    ///
    /// Panics with all observed hashes if the runs diverged.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a match twice from the same configuration and verify the final
/// state hashes match exactly.
///
/// # Panics
///
/// Panics if match creation fails for the given configuration.
#[must_use]
pub fn verify_match_determinism(config: &GameConfig, ticks: u64, delta: f64) -> bool {
    let result = verify_determinism(
        2,
        ticks,
        || Game::new(config.clone()).expect("match creation"),
        |game| {
            game.tick(delta);
        },
        Game::state_hash,
    );
    result.is_deterministic
}

/// Run N matches in parallel from the same configuration and verify they
/// all reach the same final hash. Catches non-determinism that only shows
/// under thread scheduling or memory layout variation.
///
/// # Panics
///
/// Panics if match creation fails or a worker thread panics.
#[must_use]
pub fn run_parallel_matches(config: &GameConfig, num_matches: usize, ticks: u64, delta: f64) -> bool {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                s.spawn(|| {
                    let mut game = Game::new(config.clone()).expect("match creation");
                    for _ in 0..ticks {
                        game.tick(delta);
                    }
                    game.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    hashes.windows(2).all(|w| w[0] == w[1])
}

/// Compare two match runs tick-by-tick, finding the first divergence.
///
/// Returns `None` if the runs are identical, or `Some(tick)` for the
/// first tick whose hashes differ (0 means the initial states differed).
///
/// # Panics
///
/// Panics if match creation fails for the given configuration.
#[must_use]
pub fn find_first_divergence(config: &GameConfig, ticks: u64, delta: f64) -> Option<u64> {
    let mut a = Game::new(config.clone()).expect("match creation");
    let mut b = Game::new(config.clone()).expect("match creation");

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=ticks {
        a.tick(delta);
        b.tick(delta);

        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Proptest strategies for match configurations.
pub mod strategies {
    use conquest_core::game::{Difficulty, GameConfig};
    use proptest::prelude::*;

    /// Any seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Any of the five AI handicap levels.
    pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        (0u8..=4).prop_map(Difficulty::from_level)
    }

    /// Tick lengths from sub-frame steps up to multi-second stalls.
    pub fn arb_delta() -> impl Strategy<Value = f64> {
        (1u32..=10_000).prop_map(|ms| f64::from(ms) / 1000.0)
    }

    /// A full match configuration on the standard grid.
    ///
    /// Dimensions and base count stay at their defaults so placement
    /// density (and thus creation success) is never in question; seed and
    /// difficulty vary freely.
    pub fn arb_config() -> impl Strategy<Value = GameConfig> {
        (arb_seed(), arb_difficulty()).prop_map(|(seed, difficulty)| {
            GameConfig::default()
                .with_seed(seed)
                .with_difficulty(difficulty)
        })
    }
}
