//! # Chunk
//!
//! One generated maze segment: its tile grid, exit door, chest, entrance and
//! hazard records.
//!
//! Tiles are fixed after generation except for pickups (chest, air tank,
//! item switch reward) and barrier state (door unlocked, gates closed,
//! silver doors opened). Every such flip goes through a method here.

use crate::features::DoorSpec;
use crate::grid::TileGrid;
use crate::hazards::ChunkHazards;
use crate::progression::ChunkKind;
use crate::rng::ChunkSeed;
use crate::tile::{Direction, TileKind, TilePos};

/// Position on the unbounded world plane, in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorldPos {
    /// X (east is positive).
    pub x: i64,
    /// Y (south is positive).
    pub y: i64,
}

impl WorldPos {
    /// Creates a world position.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// World position of a local tile's corner.
    #[inline]
    #[must_use]
    pub const fn of_tile(offset: Self, tile: TilePos, tile_size: i64) -> Self {
        Self {
            x: offset.x + tile.x as i64 * tile_size,
            y: offset.y + tile.y as i64 * tile_size,
        }
    }

    /// World position of a local tile's centre.
    #[inline]
    #[must_use]
    pub const fn tile_center(offset: Self, tile: TilePos, tile_size: i64) -> Self {
        let corner = Self::of_tile(offset, tile, tile_size);
        Self {
            x: corner.x + tile_size / 2,
            y: corner.y + tile_size / 2,
        }
    }
}

/// A generated chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Sequence number within the run (strictly increasing).
    pub index: u64,
    /// Seed the final layout was generated from.
    pub seed: ChunkSeed,
    /// Maze, rest point or reactor arena.
    pub kind: ChunkKind,
    /// Tile grid.
    pub grid: TileGrid,
    /// Side the chunk is entered from.
    pub entry: Direction,
    /// Exit door.
    pub door: DoorSpec,
    /// Key chest.
    pub chest: TilePos,
    /// Entrance tile.
    pub entrance: TilePos,
    /// Hazard records.
    pub hazards: ChunkHazards,
    /// Generation attempts used (1 = first try).
    pub attempts: usize,
    /// The layout is the guaranteed-connected fallback.
    pub fallback: bool,
    /// The key chest has been emptied.
    pub chest_opened: bool,
    /// The exit door has been opened with a key.
    pub door_unlocked: bool,
    /// The entrance is shut behind the player.
    pub entrance_sealed: bool,
}

impl Chunk {
    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.grid.width()
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.grid.height()
    }

    /// Tile at `pos`.
    #[inline]
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<TileKind> {
        self.grid.get(pos)
    }

    /// Takes the key from a chest tile. Returns true if a key was handed out.
    pub fn take_key(&mut self, pos: TilePos) -> bool {
        match self.grid.get(pos) {
            Some(TileKind::Chest) => {
                self.chest_opened = true;
                self.grid.set(pos, TileKind::Floor);
                true
            }
            Some(TileKind::ItemChest) => {
                self.grid.set(pos, TileKind::Floor);
                true
            }
            _ => false,
        }
    }

    /// Collects the air tank at `pos`, returning the oxygen it restores.
    pub fn collect_air_tank(&mut self, pos: TilePos) -> Option<u32> {
        let tank = self
            .hazards
            .air_tanks
            .iter_mut()
            .find(|t| t.pos == pos && !t.collected)?;
        tank.collected = true;
        self.grid.set(pos, TileKind::Floor);
        Some(tank.oxygen())
    }

    /// Marks the silver door at `pos` as opened. Returns true on first opening.
    pub fn open_silver_door(&mut self, pos: TilePos) -> bool {
        match self.hazards.silver_doors.iter_mut().find(|d| d.pos == pos) {
            Some(door) if !door.opened => {
                door.opened = true;
                true
            }
            _ => false,
        }
    }

    /// Fires the item switch at `pos`, revealing its reward chest.
    pub fn trigger_item_switch(&mut self, pos: TilePos) -> Option<TilePos> {
        let switch = self.hazards.item_switch.as_mut()?;
        if switch.pos != pos || switch.triggered {
            return None;
        }
        switch.triggered = true;
        let reward = switch.reward;
        self.grid.set(reward, TileKind::ItemChest);
        Some(reward)
    }

    /// Unlocks the exit door and shuts the entrance behind the player.
    ///
    /// Only a boundary entrance (one sitting under the predecessor's door)
    /// is shut. An interior entrance is plain floor and stays walkable.
    pub fn unlock_door(&mut self) {
        self.door_unlocked = true;
        self.entrance_sealed = !self.grid.is_interior(self.entrance);
    }

    /// Returns true if a spike sits on `pos`.
    #[must_use]
    pub fn is_spike(&self, pos: TilePos) -> bool {
        self.hazards.spikes.contains(&pos)
    }

    /// Returns true if `pos` is floor next to a discharging machine.
    #[must_use]
    pub fn is_electrified(&self, pos: TilePos) -> bool {
        self.hazards
            .electric
            .iter()
            .filter(|m| m.is_active())
            .any(|m| m.pos.x.abs_diff(pos.x) + m.pos.y.abs_diff(pos.y) == 1)
    }

    /// Returns true if a closed auto-gate sits on `pos`.
    #[must_use]
    pub fn is_gate_closed(&self, pos: TilePos) -> bool {
        self.hazards.auto_gates.iter().any(|g| g.pos == pos && g.closed)
    }

    /// Advances electric machine cycles.
    pub fn tick_hazards(&mut self, delta_ms: u64) {
        for machine in &mut self.hazards.electric {
            machine.tick(delta_ms);
        }
    }

    /// Updates auto-gates for the player's tile in this chunk (`None` when
    /// the player is elsewhere). Returns gates that closed on this call.
    pub fn update_gates(&mut self, player: Option<TilePos>) -> Vec<TilePos> {
        let mut closed = Vec::new();
        for gate in &mut self.hazards.auto_gates {
            if gate.closed {
                continue;
            }
            if player == Some(gate.pos) {
                gate.passed = true;
            } else if gate.passed {
                gate.closed = true;
                closed.push(gate.pos);
            }
        }
        closed
    }
}
