//! # Feature Placement
//!
//! Writes the chest, the exit door and the entrance into a carved grid and
//! validates that they are connected.
//!
//! ## Exclusion Zones
//!
//! Entrance, door and chest never share a tile and never touch, not even
//! diagonally (Chebyshev distance >= 2).
//!
//! ## Failure
//!
//! `FeaturePlacer::place` returns `None` when a layout cannot satisfy the
//! rules. The caller regenerates from a salted seed, and after a bounded
//! number of attempts falls back to `FeaturePlacer::fallback`, which cannot
//! fail.

use crate::carver::CarvedMaze;
use crate::grid::TileGrid;
use crate::rng::MazeRng;
use crate::tile::{Direction, TileKind, TilePos};

/// Exit door record: which side it sits on and its tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DoorSpec {
    /// Boundary side holding the door.
    pub side: Direction,
    /// Door tile (on the perimeter).
    pub pos: TilePos,
}

impl DoorSpec {
    /// Builds the door on `side` at cross-axis coordinate `coord`.
    #[must_use]
    pub const fn on_side(side: Direction, coord: usize, width: usize, height: usize) -> Self {
        let pos = match side {
            Direction::North => TilePos::new(coord, 0),
            Direction::South => TilePos::new(coord, height - 1),
            Direction::West => TilePos::new(0, coord),
            Direction::East => TilePos::new(width - 1, coord),
        };
        Self { side, pos }
    }

    /// Interior tile directly behind the door.
    #[must_use]
    pub fn inner(self) -> Option<TilePos> {
        self.pos.step(self.side.opposite())
    }
}

/// Where the entrance of a chunk goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntrancePlan {
    /// Fixed perimeter tile on the entry side, aligned to a predecessor door.
    Boundary(TilePos),
    /// Random interior floor tile (the very first chunk of a run).
    Interior,
}

/// Chest, door and entrance written into a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLayout {
    /// Grid with CHEST/DOOR written in.
    pub grid: TileGrid,
    /// Side the chunk is entered from.
    pub entry: Direction,
    /// Exit door.
    pub door: DoorSpec,
    /// Key chest tile.
    pub chest: TilePos,
    /// Entrance tile.
    pub entrance: TilePos,
}

impl PlacedLayout {
    /// Tiles hazards must keep clear of.
    #[inline]
    #[must_use]
    pub const fn exclusion_zone(&self) -> [TilePos; 2] {
        [self.entrance, self.door.pos]
    }
}

/// Places core features on carved grids.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeaturePlacer;

impl FeaturePlacer {
    /// Places entrance corridor, chest and door on a carved maze.
    ///
    /// Returns `None` when no valid placement exists or the chest/door walk
    /// fails; the grid is consumed either way.
    #[must_use]
    pub fn place(
        carved: CarvedMaze,
        rng: &mut MazeRng,
        entry: Direction,
        plan: EntrancePlan,
    ) -> Option<PlacedLayout> {
        let mut grid = carved.grid;
        let (width, height) = (grid.width(), grid.height());

        let fixed_entrance = match plan {
            EntrancePlan::Boundary(pos) => {
                open_entrance(&mut grid, pos, entry);
                Some(pos)
            }
            EntrancePlan::Interior => None,
        };

        // 1. Chest
        let chest_candidates: Vec<TilePos> = grid
            .positions_of(TileKind::Floor)
            .filter(|p| grid.is_interior(*p))
            .filter(|p| fixed_entrance.map_or(true, |e| !p.is_near(e)))
            .collect();
        if chest_candidates.is_empty() {
            return None;
        }
        let chest = chest_candidates[rng.next_int(chest_candidates.len())];
        grid.set(chest, TileKind::Chest);

        // 2. Door: uniform side != entry, then a coordinate clear of chest/entrance
        let sides: Vec<Direction> = Direction::ALL.into_iter().filter(|d| *d != entry).collect();
        let first = rng.next_int(sides.len());
        let mut door = None;
        for side in sides.iter().cycle().skip(first).take(sides.len()) {
            let span = if side.is_horizontal() { height } else { width };
            let coords: Vec<DoorSpec> = (1..span - 1)
                .map(|c| DoorSpec::on_side(*side, c, width, height))
                .filter(|d| !d.pos.is_near(chest))
                .filter(|d| fixed_entrance.map_or(true, |e| !d.pos.is_near(e)))
                .collect();
            if !coords.is_empty() {
                door = Some(coords[rng.next_int(coords.len())]);
                break;
            }
        }
        let door = door?;
        if let Some(inner) = door.inner() {
            if grid.is(inner, TileKind::Wall) {
                grid.set(inner, TileKind::Floor);
            }
        }
        grid.set(door.pos, TileKind::Door);

        // 3. Entrance for the opening chunk
        let entrance = match fixed_entrance {
            Some(pos) => pos,
            None => {
                let spots: Vec<TilePos> = grid
                    .positions_of(TileKind::Floor)
                    .filter(|p| grid.is_interior(*p))
                    .filter(|p| !p.is_near(chest) && !p.is_near(door.pos))
                    .collect();
                if spots.is_empty() {
                    return None;
                }
                spots[rng.next_int(spots.len())]
            }
        };

        if !grid.is_reachable(chest, door.pos) || !grid.is_reachable(entrance, chest) {
            return None;
        }

        Some(PlacedLayout {
            grid,
            entry,
            door,
            chest,
            entrance,
        })
    }

    /// Layout that is connected by construction: an open room.
    ///
    /// Chest goes to the interior tile farthest from the entrance, the door
    /// to the first legal spot, preferring the side facing the entry.
    #[must_use]
    pub fn fallback(width: usize, height: usize, entry: Direction, plan: EntrancePlan) -> PlacedLayout {
        let mut grid = TileGrid::filled(width, height, TileKind::Wall);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.set(TilePos::new(x, y), TileKind::Floor);
            }
        }

        let entrance = match plan {
            EntrancePlan::Boundary(pos) => {
                open_entrance(&mut grid, pos, entry);
                pos
            }
            EntrancePlan::Interior => TilePos::new(1, 1),
        };

        let mut chest = TilePos::new(width - 2, height - 2);
        let mut best = 0;
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let pos = TilePos::new(x, y);
                let dist = pos.chebyshev(entrance);
                if dist > best {
                    best = dist;
                    chest = pos;
                }
            }
        }
        grid.set(chest, TileKind::Chest);

        let preferred = entry.opposite();
        let order = std::iter::once(preferred)
            .chain(Direction::ALL.into_iter().filter(|d| *d != preferred && *d != entry));
        let door = order
            .flat_map(|side| {
                let span = if side.is_horizontal() { height } else { width };
                (1..span - 1).map(move |c| DoorSpec::on_side(side, c, width, height))
            })
            .find(|d| !d.pos.is_near(chest) && !d.pos.is_near(entrance))
            .unwrap_or_else(|| DoorSpec::on_side(preferred, 1, width, height));
        grid.set(door.pos, TileKind::Door);

        PlacedLayout {
            grid,
            entry,
            door,
            chest,
            entrance,
        }
    }
}

/// Opens an entrance tile on the perimeter plus the interior tile behind it.
///
/// The interior tile is left alone if it already holds a chest.
pub fn open_entrance(grid: &mut TileGrid, entrance: TilePos, entry: Direction) {
    grid.set(entrance, TileKind::Floor);
    if let Some(inner) = entrance.step(entry.opposite()) {
        if grid.is_interior(inner)
            && !matches!(grid.get(inner), Some(TileKind::Chest | TileKind::ItemChest))
        {
            grid.set(inner, TileKind::Floor);
        }
    }
}
