//! The world: tile grid, base arena, and spatial queries.
//!
//! Bases live in a dense arena indexed by [`BaseId`]; ids never change for
//! the lifetime of a match. Placement fills the four map quadrants evenly
//! and rejects layouts where any base has fewer than two neighbors in link
//! range, so no starting position is unreachable.

use serde::{Deserialize, Serialize};

use crate::base::{Base, BaseId, LINK_RANGE};
use crate::error::{GameError, Result};
use crate::game::GameConfig;
use crate::rng::GameRng;
use crate::terrain::{TerrainGrid, TileKind};

/// Bases closer than this to an existing base are rejected at placement.
const MIN_BASE_SPACING: u32 = 2;
/// Every placed base needs at least this many others within link range.
const MIN_CONNECTED_NEIGHBORS: usize = 2;
/// Full placement attempts before match creation fails.
const MAX_PLACEMENT_RETRIES: u32 = 64;
/// Coordinate samples per base before the attempt is abandoned.
const MAX_SAMPLE_ATTEMPTS: u32 = 10_000;

/// A tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Column, 0-based from the west edge.
    pub x: i32,
    /// Row, 0-based from the north edge.
    pub y: i32,
}

/// Grid distance: `ceil(sqrt(dx^2 + dy^2))`. Symmetric, zero iff equal.
#[must_use]
pub fn distance(a: GridPos, b: GridPos) -> u32 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    (dx * dx + dy * dy).sqrt().ceil() as u32
}

/// Tile grid plus the base arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    terrain: TerrainGrid,
    bases: Vec<Base>,
}

impl World {
    /// Build a world from existing parts. Scenario and test entry point;
    /// matches normally go through [`World::generate`].
    #[must_use]
    pub fn new(terrain: TerrainGrid, bases: Vec<Base>) -> Self {
        debug_assert!(bases.iter().enumerate().all(|(i, b)| b.id == i));
        Self { terrain, bases }
    }

    /// Generate terrain and place bases per the match configuration.
    ///
    /// Terrain is generated once; if a placement attempt fails the
    /// connectivity requirement, only the bases are re-placed. Attempts are
    /// bounded and exhaustion fails with [`GameError::PlacementFailed`].
    pub fn generate(config: &GameConfig, rng: &mut GameRng) -> Result<Self> {
        let terrain = TerrainGrid::generate(
            config.width,
            config.height,
            config.terrain_iterations,
            rng,
        );

        for attempt in 1..=MAX_PLACEMENT_RETRIES {
            match place_bases(&terrain, config.num_bases, rng) {
                Some(bases) if placement_connected(&bases) => {
                    tracing::debug!(attempt, num_bases = bases.len(), "bases placed");
                    return Ok(Self { terrain, bases });
                }
                Some(_) => {
                    tracing::debug!(attempt, "placement rejected: connectivity");
                }
                None => {
                    tracing::debug!(attempt, "placement rejected: no room");
                }
            }
        }

        Err(GameError::PlacementFailed {
            attempts: MAX_PLACEMENT_RETRIES,
            reason: format!(
                "could not place {} bases with {MIN_CONNECTED_NEIGHBORS} neighbors each within distance {LINK_RANGE}",
                config.num_bases
            ),
        })
    }

    /// Grid width in tiles.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.terrain.width()
    }

    /// Grid height in tiles.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.terrain.height()
    }

    /// Tile lookup; out-of-range coordinates return `None`.
    #[must_use]
    pub fn tile(&self, x: i32, y: i32) -> Option<TileKind> {
        self.terrain.get(x, y)
    }

    /// All bases in id order.
    #[must_use]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Number of bases (fixed at creation).
    #[must_use]
    pub fn num_bases(&self) -> usize {
        self.bases.len()
    }

    /// Base lookup by id.
    #[must_use]
    pub fn base(&self, id: BaseId) -> Option<&Base> {
        self.bases.get(id)
    }

    /// Mutable base lookup by id.
    pub fn base_mut(&mut self, id: BaseId) -> Option<&mut Base> {
        self.bases.get_mut(id)
    }

    /// The base occupying an exact coordinate, if any.
    #[must_use]
    pub fn base_at(&self, x: i32, y: i32) -> Option<BaseId> {
        let pos = GridPos { x, y };
        self.bases.iter().find(|b| b.position == pos).map(|b| b.id)
    }

    /// All other bases within `max_distance` of `id`, in id order.
    #[must_use]
    pub fn nearby_bases(&self, id: BaseId, max_distance: u32) -> Vec<BaseId> {
        let origin = self.bases[id].position;
        self.bases
            .iter()
            .filter(|b| b.id != id && distance(origin, b.position) <= max_distance)
            .map(|b| b.id)
            .collect()
    }

    /// Whether any base currently has `id` as its attack target.
    #[must_use]
    pub fn is_base_attacked(&self, id: BaseId) -> bool {
        self.bases.iter().any(|b| b.attack_target == Some(id))
    }

    /// Distance between two bases by id.
    #[must_use]
    pub fn distance_between(&self, a: BaseId, b: BaseId) -> u32 {
        distance(self.bases[a].position, self.bases[b].position)
    }

    /// Set or clear a base's supply link, enforcing the relation rules:
    /// no self-loops, no 2-cycles, and the target must share the source's
    /// owner. Returns whether the request was applied.
    pub fn set_link(&mut self, src: BaseId, target: Option<BaseId>) -> bool {
        let Some(dst) = target else {
            self.bases[src].link_target = None;
            return true;
        };
        if src == dst {
            return false;
        }
        if self.bases[dst].link_target == Some(src) {
            return false;
        }
        if self.bases[dst].owner != self.bases[src].owner {
            return false;
        }
        self.bases[src].link_target = Some(dst);
        true
    }
}

/// One placement attempt: fill each quadrant with `num_bases / 4` bases.
/// Quadrant `q`'s bases occupy ids `q * (num_bases/4) ..` contiguously.
fn place_bases(terrain: &TerrainGrid, num_bases: usize, rng: &mut GameRng) -> Option<Vec<Base>> {
    let half_w = terrain.width() / 2;
    let half_h = terrain.height() / 2;
    let quadrants = [(0, 0), (half_w, 0), (0, half_h), (half_w, half_h)];
    let per_quadrant = num_bases / 4;

    let mut bases: Vec<Base> = Vec::with_capacity(num_bases);
    for (qx, qy) in quadrants {
        for _ in 0..per_quadrant {
            let mut placed = false;
            for _ in 0..MAX_SAMPLE_ATTEMPTS {
                let x = qx as i32 + rng.next_below(u64::from(half_w)) as i32;
                let y = qy as i32 + rng.next_below(u64::from(half_h)) as i32;
                let pos = GridPos { x, y };

                let Some(tile) = terrain.get(x, y) else { continue };
                if !tile.is_buildable() {
                    continue;
                }
                if bases
                    .iter()
                    .any(|b| distance(b.position, pos) <= MIN_BASE_SPACING)
                {
                    continue;
                }

                let size = rng.next_below(9) as u32 + 1;
                let id = bases.len();
                bases.push(Base::new(id, pos, size, tile.defense_value()));
                placed = true;
                break;
            }
            if !placed {
                return None;
            }
        }
    }
    Some(bases)
}

/// Every base must see at least two others within link range.
fn placement_connected(bases: &[Base]) -> bool {
    bases.iter().all(|base| {
        let neighbors = bases
            .iter()
            .filter(|other| {
                other.id != base.id && distance(base.position, other.position) <= LINK_RANGE
            })
            .count();
        neighbors >= MIN_CONNECTED_NEIGHBORS
    })
}
