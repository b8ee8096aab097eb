//! Match fixtures shared across test crates.

use conquest_core::game::{Difficulty, Game, GameConfig};

/// The standard 96x96, 64-base match on a fixed seed.
#[must_use]
pub fn standard_config(seed: u64) -> GameConfig {
    GameConfig::default().with_seed(seed)
}

/// A match where the AI factions grow at full handicap.
#[must_use]
pub fn brutal_config(seed: u64) -> GameConfig {
    standard_config(seed).with_difficulty(Difficulty::Brutal)
}

/// Create a match and advance it by `ticks` steps of `delta` seconds.
///
/// # Panics
///
/// Panics if match creation fails for the given configuration.
#[must_use]
pub fn run_match(config: GameConfig, ticks: u64, delta: f64) -> Game {
    let mut game = Game::new(config).expect("match creation");
    for _ in 0..ticks {
        game.tick(delta);
    }
    game
}
