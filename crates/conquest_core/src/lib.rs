//! # Conquest Core
//!
//! Deterministic simulation core for a territorial-conquest strategy game.
//!
//! This crate contains **only** deterministic game logic:
//! - No rendering
//! - No IO
//! - No system randomness (a single seeded stream drives every subsystem)
//! - No wall-clock time (the caller supplies elapsed seconds)
//!
//! This separation enables:
//! - Headless CI runs and balance testing
//! - Seed-exact replay of whole matches
//! - Determinism testing via state hashes
//!
//! ## Crate Structure
//!
//! - [`rng`] - Seeded random stream shared by all subsystems
//! - [`terrain`] - Fractal tile-grid generation
//! - [`world`] - Tile grid, base arena, and spatial queries
//! - [`base`] - Base state and relation rules
//! - [`systems`] - Per-tick economy, reinforcement, and combat
//! - [`player`] - Faction state and controllers
//! - [`ai`] - Heuristic driver for computer factions
//! - [`game`] - Match orchestration and the command surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod base;
pub mod error;
pub mod events;
pub mod game;
pub mod player;
pub mod rng;
pub mod systems;
pub mod terrain;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::base::{Base, BaseId, GARRISON_CAP, LINK_RANGE};
    pub use crate::error::{GameError, Result};
    pub use crate::events::GameEvent;
    pub use crate::game::{Difficulty, Game, GameConfig, MatchOutcome};
    pub use crate::player::{Controller, Player, PlayerId};
    pub use crate::rng::GameRng;
    pub use crate::terrain::{TerrainGrid, TileKind};
    pub use crate::world::{distance, GridPos, World};
}
