//! Procedural terrain generation.
//!
//! Generates a tile grid by midpoint displacement applied independently to
//! the four map quadrants, so each faction's starting corner gets a
//! comparable mix of land. The grid starts as open water; each displacement
//! step seeds corner heights and fills in a small diamond-square cell.
//! Later steps may overwrite earlier tiles; only the final grid matters.

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;

/// Weighted corner seeding draws from `0..SEED_DRAW_RANGE`.
const SEED_DRAW_RANGE: u64 = 1024;
/// A grassland tile produced by displacement becomes forest one time in 4.
const FOREST_CHANCE: u64 = 4;

/// Terrain classification for a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Impassable for base placement.
    Water,
    /// Open land, no defensive value.
    Grassland,
    /// Grassland variant with cover.
    Forest,
    /// Elevated ground.
    Hill,
    /// High ground, strongest defensive value.
    Mountain,
}

impl TileKind {
    /// Height used during generation. Forest is grassland-height land.
    #[must_use]
    pub fn height_value(self) -> i32 {
        match self {
            TileKind::Water => 0,
            TileKind::Grassland | TileKind::Forest => 1,
            TileKind::Hill => 2,
            TileKind::Mountain => 3,
        }
    }

    /// Defensive bonus granted to a base built on this tile.
    #[must_use]
    pub fn defense_value(self) -> u32 {
        match self {
            TileKind::Water | TileKind::Grassland => 0,
            TileKind::Forest => 4,
            TileKind::Hill => 6,
            TileKind::Mountain => 10,
        }
    }

    /// Whether a base can be placed on this tile.
    #[must_use]
    pub fn is_buildable(self) -> bool {
        self != TileKind::Water
    }
}

/// A generated tile grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
}

impl TerrainGrid {
    /// Generate a grid by quadrant-local midpoint displacement.
    ///
    /// `width` and `height` must be even and at least 8; `iterations` is the
    /// total displacement budget split evenly across the four quadrants.
    #[must_use]
    pub fn generate(width: u32, height: u32, iterations: u32, rng: &mut GameRng) -> Self {
        debug_assert!(width >= 8 && height >= 8);
        debug_assert!(width % 2 == 0 && height % 2 == 0);

        let mut grid = Self {
            width,
            height,
            tiles: vec![TileKind::Water; (width * height) as usize],
        };

        let half_w = width / 2;
        let half_h = height / 2;
        // Quadrant origins in reading order: NW, NE, SW, SE.
        let quadrants = [(0, 0), (half_w, 0), (0, half_h), (half_w, half_h)];
        let steps = iterations / 4;

        for (qx, qy) in quadrants {
            for _ in 0..steps {
                let x = qx as i32 + rng.next_below(u64::from(half_w - 2)) as i32;
                let y = qy as i32 + rng.next_below(u64::from(half_h - 2)) as i32;
                grid.displace_cell(x, y, rng);
            }
        }

        tracing::debug!(width, height, iterations, "terrain generated");
        grid
    }

    /// Grid width in tiles.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile lookup; out-of-range coordinates return `None`.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<TileKind> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.tiles[(y as u32 * self.width + x as u32) as usize])
    }

    fn set(&mut self, x: i32, y: i32, kind: TileKind) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        self.tiles[(y as u32 * self.width + x as u32) as usize] = kind;
    }

    /// One diamond-square cell anchored at `(x, y)` covering a 3x3 patch.
    fn displace_cell(&mut self, x: i32, y: i32, rng: &mut GameRng) {
        // Seed any corner still under water with a weighted random kind.
        for (cx, cy) in [(x, y), (x + 2, y), (x, y + 2), (x + 2, y + 2)] {
            if self.get(cx, cy) == Some(TileKind::Water) {
                self.set(cx, cy, seed_kind(rng.next_below(SEED_DRAW_RANGE)));
            }
        }

        // Diamond step: center from the four diagonal corners.
        self.displace_point(x + 1, y + 1, &[(x, y), (x + 2, y), (x, y + 2), (x + 2, y + 2)], rng);

        // Square steps: edge midpoints from their orthogonal neighbors.
        for (px, py) in [(x, y + 1), (x + 1, y), (x + 2, y + 1), (x + 1, y + 2)] {
            let neighbors = [(px - 1, py), (px + 1, py), (px, py - 1), (px, py + 1)];
            self.displace_point(px, py, &neighbors, rng);
        }
    }

    /// Set `(x, y)` from the truncated mean height of the in-bounds
    /// `sources`, plus a jitter in `[0, 2)`.
    fn displace_point(&mut self, x: i32, y: i32, sources: &[(i32, i32)], rng: &mut GameRng) {
        let mut sum = 0.0_f64;
        let mut count = 0u32;
        for &(sx, sy) in sources {
            if let Some(kind) = self.get(sx, sy) {
                sum += f64::from(kind.height_value());
                count += 1;
            }
        }
        if count == 0 {
            return;
        }

        let jitter = rng.next_below(1000) as f64 / 500.0;
        let height = (sum / f64::from(count) + jitter) as i32;

        let mut kind = kind_from_height(height);
        if kind == TileKind::Grassland && rng.chance(FOREST_CHANCE) {
            kind = TileKind::Forest;
        }
        self.set(x, y, kind);
    }
}

/// Corner seeding distribution over a draw in `0..1024`.
fn seed_kind(draw: u64) -> TileKind {
    match draw {
        0..=63 => TileKind::Water,
        64..=511 => TileKind::Grassland,
        512..=767 => TileKind::Hill,
        _ => TileKind::Mountain,
    }
}

fn kind_from_height(height: i32) -> TileKind {
    match height {
        0 => TileKind::Water,
        1 => TileKind::Grassland,
        2 => TileKind::Hill,
        _ => TileKind::Mountain,
    }
}
