//! # Maze Carver
//!
//! Randomized depth-first backtracker over a stride-2 lattice.
//!
//! Odd coordinates are cells, even coordinates are walls between them, so
//! every corridor is exactly one tile wide. The carved floor forms a
//! spanning tree over all lattice cells. A separate detour pass then punches
//! a few extra openings to add loops.

use crate::grid::{odd_dimension, TileGrid};
use crate::rng::MazeRng;
use crate::tile::{Direction, TileKind, TilePos};

/// Tries per detour before giving up on it.
const DETOUR_TRIES: usize = 20;

/// Result of one carving pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarvedMaze {
    /// The carved grid.
    pub grid: TileGrid,
    /// Lattice cell the backtracker started from.
    pub start: TilePos,
}

/// Stateless maze carver.
#[derive(Clone, Copy, Debug, Default)]
pub struct MazeCarver;

impl MazeCarver {
    /// Carves a fresh maze. Even dimensions are rounded up to odd.
    #[must_use]
    pub fn carve(width: usize, height: usize, rng: &mut MazeRng) -> CarvedMaze {
        let width = odd_dimension(width);
        let height = odd_dimension(height);
        let mut grid = TileGrid::filled(width, height, TileKind::Wall);

        let start = TilePos::new(
            rng.next_int((width - 1) / 2) * 2 + 1,
            rng.next_int((height - 1) / 2) * 2 + 1,
        );
        grid.set(start, TileKind::Floor);

        let mut stack = vec![start];
        let mut options: Vec<(TilePos, TilePos)> = Vec::with_capacity(4);
        while let Some(&cell) = stack.last() {
            options.clear();
            for dir in Direction::ALL {
                let Some(mid) = cell.step(dir) else { continue };
                let Some(next) = mid.step(dir) else { continue };
                if grid.is_interior(next) && grid.is(next, TileKind::Wall) {
                    options.push((mid, next));
                }
            }

            if options.is_empty() {
                stack.pop();
                continue;
            }

            let (mid, next) = options[rng.next_int(options.len())];
            grid.set(mid, TileKind::Floor);
            grid.set(next, TileKind::Floor);
            stack.push(next);
        }

        CarvedMaze { grid, start }
    }

    /// Number of detours for a grid of this size.
    #[must_use]
    pub fn detour_count(width: usize, height: usize, rng: &mut MazeRng) -> usize {
        let base = width.min(height);
        let bonus = if base >= 13 {
            2
        } else if base >= 11 {
            1
        } else {
            0
        };
        rng.next_int((base / 3).max(1)) + 1 + bonus
    }

    /// Opens extra interior walls next to existing floor, adding loops.
    ///
    /// Never touches the perimeter or any non-wall tile. Returns how many
    /// walls were opened.
    pub fn add_detours(grid: &mut TileGrid, rng: &mut MazeRng) -> usize {
        let (width, height) = (grid.width(), grid.height());
        let wanted = Self::detour_count(width, height, rng);
        let mut opened = 0;

        for _ in 0..wanted {
            for _ in 0..DETOUR_TRIES {
                let pos = TilePos::new(rng.next_int(width - 2) + 1, rng.next_int(height - 2) + 1);
                let touches_floor = grid
                    .neighbors(pos)
                    .any(|n| grid.get(n).is_some_and(|t| t != TileKind::Wall));
                if grid.is(pos, TileKind::Wall) && touches_floor {
                    grid.set(pos, TileKind::Floor);
                    opened += 1;
                    break;
                }
            }
        }
        opened
    }
}
