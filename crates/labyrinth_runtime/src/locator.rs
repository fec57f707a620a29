//! World position to chunk tile lookup.
//!
//! Chunks can overlap on their shared boundary line (and, after a few
//! bends, elsewhere). The window is scanned oldest-first and the first
//! chunk whose half-open bounds contain the point wins, so the answer for
//! a given point only changes when that chunk is destroyed.

use labyrinth_procedural::{TileKind, TilePos, WorldPos};

use crate::window::ChunkWindow;

/// Result of a successful lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Located {
    /// Index of the chunk holding the tile.
    pub chunk_index: u64,
    /// Position of that chunk in the window.
    pub slot: usize,
    /// Local tile.
    pub tile: TilePos,
    /// Tile kind.
    pub kind: TileKind,
}

/// Global tile coordinates: world units divided by tile size, rounded down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlobalTile {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl GlobalTile {
    /// Creates a global tile coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Global tile holding `pos`.
    #[inline]
    #[must_use]
    pub const fn of_world(pos: WorldPos, tile_size: i64) -> Self {
        Self {
            x: pos.x.div_euclid(tile_size),
            y: pos.y.div_euclid(tile_size),
        }
    }

    /// World position of this tile's centre.
    #[inline]
    #[must_use]
    pub const fn world_center(self, tile_size: i64) -> WorldPos {
        WorldPos::new(self.x * tile_size + tile_size / 2, self.y * tile_size + tile_size / 2)
    }

    /// Neighbouring tile one step in `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, (dx, dy): (i64, i64)) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance.
    #[inline]
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u64 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl ChunkWindow {
    /// Finds the tile under a world position.
    #[must_use]
    pub fn locate(&self, pos: WorldPos) -> Option<Located> {
        let slot = self.slot_at(pos)?;
        let active = &self.chunks()[slot];
        let tile = active.local_tile(pos, self.tile_size())?;
        Some(Located {
            chunk_index: active.chunk.index,
            slot,
            tile,
            kind: active.chunk.tile(tile)?,
        })
    }

    /// Finds the tile at global tile coordinates.
    #[must_use]
    pub fn locate_tile(&self, tile: GlobalTile) -> Option<Located> {
        self.locate(tile.world_center(self.tile_size()))
    }

    /// Global tile holding `pos`.
    #[inline]
    #[must_use]
    pub const fn global_tile(&self, pos: WorldPos) -> GlobalTile {
        GlobalTile::of_world(pos, self.tile_size())
    }

    /// World centre of a global tile.
    #[inline]
    #[must_use]
    pub const fn world_center(&self, tile: GlobalTile) -> WorldPos {
        tile.world_center(self.tile_size())
    }
}
