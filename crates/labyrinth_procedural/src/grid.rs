//! # Tile Grid
//!
//! Row-major tile storage for one chunk, plus the breadth-first walks used
//! to validate generated layouts.

use std::collections::VecDeque;

use crate::tile::{Direction, TileKind, TilePos};

/// Smallest legal chunk dimension.
pub const MIN_DIMENSION: usize = 5;

/// Rounds a requested dimension up to the next odd value (minimum 5).
///
/// Odd sizes keep a single-thick perimeter around the stride-2 lattice.
#[inline]
#[must_use]
pub const fn odd_dimension(requested: usize) -> usize {
    let n = if requested < MIN_DIMENSION {
        MIN_DIMENSION
    } else {
        requested
    };
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

/// A width x height grid of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Creates a grid filled with `fill`.
    #[must_use]
    pub fn filled(width: usize, height: usize, fill: TileKind) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    /// Grid width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row-major tile slice.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Zero-copy byte view of the tiles (one `u8` code per tile).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tiles)
    }

    /// Returns true if `pos` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Returns true if `pos` is strictly inside the perimeter.
    #[inline]
    #[must_use]
    pub const fn is_interior(&self, pos: TilePos) -> bool {
        pos.x > 0 && pos.y > 0 && pos.x + 1 < self.width && pos.y + 1 < self.height
    }

    /// Returns the tile at `pos`, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: TilePos) -> Option<TileKind> {
        if self.contains(pos) {
            Some(self.tiles[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    /// Returns true if the tile at `pos` is exactly `kind`.
    #[inline]
    #[must_use]
    pub fn is(&self, pos: TilePos, kind: TileKind) -> bool {
        self.get(pos) == Some(kind)
    }

    /// Writes a tile. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, pos: TilePos, kind: TileKind) {
        if self.contains(pos) {
            self.tiles[pos.y * self.width + pos.x] = kind;
        }
    }

    /// In-bounds orthogonal neighbours of `pos`, in N, E, S, W order.
    pub fn neighbors(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| pos.step(dir))
            .filter(move |next| self.contains(*next))
    }

    /// Iterates every position holding `kind`, row-major.
    pub fn positions_of(&self, kind: TileKind) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, tile)| **tile == kind)
            .map(|(i, _)| TilePos::new(i % self.width, i / self.width))
    }

    /// Marks every tile reachable from `start` through tiles accepted by
    /// `passable`. `start` itself is always visited when in bounds.
    #[must_use]
    pub fn flood(&self, start: TilePos, passable: impl Fn(TileKind) -> bool) -> Vec<bool> {
        let mut seen = vec![false; self.tiles.len()];
        if !self.contains(start) {
            return seen;
        }
        let mut queue = VecDeque::with_capacity(self.width + self.height);
        seen[start.y * self.width + start.x] = true;
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for next in self.neighbors(pos) {
                let idx = next.y * self.width + next.x;
                if !seen[idx] && passable(self.tiles[idx]) {
                    seen[idx] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Breadth-first reachability over non-wall tiles.
    #[must_use]
    pub fn is_reachable(&self, from: TilePos, to: TilePos) -> bool {
        if !self.contains(to) {
            return false;
        }
        self.flood(from, TileKind::is_open_for_layout)[to.y * self.width + to.x]
    }
}
