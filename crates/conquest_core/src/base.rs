//! Base state and the relation rules between bases.
//!
//! A base is a fixed installation on the tile grid. It grows a garrison
//! over time and may hold at most one outgoing relation of each kind:
//! a supply link that drains garrison toward a friendly base, and an
//! attack that drains garrison against an enemy base. Both relations are
//! validated at the point of mutation; invalid requests are rejected, not
//! errors.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::world::GridPos;

/// Stable index of a base in the world's arena.
pub type BaseId = usize;

/// Maximum garrison a base can hold or receive.
pub const GARRISON_CAP: f64 = 1e9;

/// Maximum distance for links, attacks, and colonization.
pub const LINK_RANGE: u32 = 24;

/// Minimum garrison required to declare an attack, and the floor at which
/// an ongoing attack is abandoned.
pub const MIN_ATTACK_GARRISON: f64 = 10.0;

/// A single base on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    /// Arena index, equal to this base's position in the world's base list.
    pub id: BaseId,
    /// Tile coordinate. Bases never move.
    pub position: GridPos,
    /// Growth rate factor, 1..=9 (raised to at least 5 for starting bases).
    pub size: u32,
    /// Defensive bonus inherited from the tile at creation.
    pub defense_value: u32,
    /// Garrison strength, `0..=GARRISON_CAP`.
    pub garrison: f64,
    /// Controlling player, if any.
    pub owner: Option<PlayerId>,
    /// Outgoing supply link.
    pub link_target: Option<BaseId>,
    /// Outgoing attack.
    pub attack_target: Option<BaseId>,
    /// Attack die fixed when the current attack was declared.
    pub attack_roll: u32,
    /// Defense die (plus target defense value) fixed at declaration.
    pub defense_roll: u32,
}

impl Base {
    /// Create an unowned base with an empty garrison.
    #[must_use]
    pub fn new(id: BaseId, position: GridPos, size: u32, defense_value: u32) -> Self {
        Self {
            id,
            position,
            size,
            defense_value,
            garrison: 0.0,
            owner: None,
            link_target: None,
            attack_target: None,
            attack_roll: 0,
            defense_roll: 0,
        }
    }

    /// Whether this base is currently attacking another.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.attack_target.is_some()
    }

    /// Whether this base is feeding garrison to another.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.link_target.is_some()
    }

    /// Clear the outgoing attack and its frozen rolls.
    pub fn clear_attack(&mut self) {
        self.attack_target = None;
        self.attack_roll = 0;
        self.defense_roll = 0;
    }
}
