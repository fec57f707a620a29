//! # Movement Rules
//!
//! Tile legality for the player and the effects a tile has once stepped on.
//! Both are exhaustive over `TileKind`.

use labyrinth_procedural::{Chunk, TileKind, WorldPos};

use crate::locator::Located;
use crate::window::ChunkWindow;

/// Why a step was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockReason {
    /// No live chunk holds the target.
    Missing,
    /// Solid tile (wall, reactor core, wall-mounted prop).
    Solid,
    /// A key is required.
    NeedsKey,
    /// Auto-gate shut behind the player.
    GateClosed,
    /// The entrance was sealed when the exit door opened.
    EntranceSealed,
}

/// Answer to a movement query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCheck {
    /// The step is allowed.
    Open,
    /// The step is refused.
    Blocked(BlockReason),
}

impl StepCheck {
    /// Returns true if the step is allowed.
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Can the player step onto `located` in `chunk` while holding `keys`?
#[must_use]
pub fn check_step(located: &Located, chunk: &Chunk, keys: u32) -> StepCheck {
    if chunk.entrance_sealed && located.tile == chunk.entrance {
        return StepCheck::Blocked(BlockReason::EntranceSealed);
    }
    let needs_key = |done: bool| {
        if done || keys > 0 {
            StepCheck::Open
        } else {
            StepCheck::Blocked(BlockReason::NeedsKey)
        }
    };
    match located.kind {
        TileKind::Wall | TileKind::Reactor | TileKind::Special => StepCheck::Blocked(BlockReason::Solid),
        TileKind::Floor | TileKind::Chest | TileKind::ItemChest | TileKind::Oxygen => StepCheck::Open,
        TileKind::Door => needs_key(chunk.door_unlocked),
        TileKind::SilverDoor => needs_key(
            chunk
                .hazards
                .silver_doors
                .iter()
                .any(|d| d.pos == located.tile && d.opened),
        ),
        TileKind::AutoGate => {
            if chunk.is_gate_closed(located.tile) {
                StepCheck::Blocked(BlockReason::GateClosed)
            } else {
                StepCheck::Open
            }
        }
    }
}

/// World-space form of [`check_step`]. A missing tile is blocked.
#[must_use]
pub fn check_world_step(window: &ChunkWindow, target: WorldPos, keys: u32) -> StepCheck {
    let Some(located) = window.locate(target) else {
        return StepCheck::Blocked(BlockReason::Missing);
    };
    if window.is_sealed_entrance(target) {
        return StepCheck::Blocked(BlockReason::EntranceSealed);
    }
    match window.get(located.chunk_index) {
        Some(active) => check_step(&located, &active.chunk, keys),
        None => StepCheck::Blocked(BlockReason::Missing),
    }
}

/// Something that happens when the player stands on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileEffect {
    /// A chest hands out a key.
    Key,
    /// An air tank restores this much oxygen.
    Oxygen(u32),
    /// Spike damage.
    Spike,
    /// An adjacent machine is discharging.
    Shock,
    /// The item switch reveals its reward chest.
    ItemSwitch,
    /// Standing on the exit door.
    Exit,
}

/// Effects of standing on `located`, in the order they apply.
#[must_use]
pub fn effects_at(located: &Located, chunk: &Chunk) -> Vec<TileEffect> {
    let mut effects = Vec::new();
    match located.kind {
        TileKind::Chest | TileKind::ItemChest => effects.push(TileEffect::Key),
        TileKind::Oxygen => {
            if let Some(tank) = chunk
                .hazards
                .air_tanks
                .iter()
                .find(|t| t.pos == located.tile && !t.collected)
            {
                effects.push(TileEffect::Oxygen(tank.oxygen()));
            }
        }
        TileKind::Door => effects.push(TileEffect::Exit),
        TileKind::Floor => {
            if chunk.is_spike(located.tile) {
                effects.push(TileEffect::Spike);
            }
            if chunk.is_electrified(located.tile) {
                effects.push(TileEffect::Shock);
            }
            if chunk
                .hazards
                .item_switch
                .is_some_and(|s| s.pos == located.tile && !s.triggered)
            {
                effects.push(TileEffect::ItemSwitch);
            }
        }
        TileKind::Wall | TileKind::Special | TileKind::SilverDoor | TileKind::AutoGate | TileKind::Reactor => {}
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_procedural::{
        AirTank, AutoGate, ChunkHazards, ChunkKind, ChunkSeed, Direction, DoorSpec, ElectricHazard, ItemSwitch,
        SilverDoor, TileGrid, TilePos,
    };

    fn chunk() -> Chunk {
        let mut grid = TileGrid::filled(9, 9, TileKind::Floor);
        for (pos, kind) in [
            (TilePos::new(0, 4), TileKind::Floor),
            (TilePos::new(8, 4), TileKind::Door),
            (TilePos::new(2, 2), TileKind::Chest),
            (TilePos::new(3, 3), TileKind::Oxygen),
            (TilePos::new(4, 1), TileKind::SilverDoor),
            (TilePos::new(5, 1), TileKind::AutoGate),
            (TilePos::new(6, 6), TileKind::Reactor),
            (TilePos::new(0, 0), TileKind::Wall),
            (TilePos::new(1, 0), TileKind::Special),
        ] {
            grid.set(pos, kind);
        }
        Chunk {
            index: 3,
            seed: ChunkSeed::new("move-3"),
            kind: ChunkKind::Maze,
            grid,
            entry: Direction::West,
            door: DoorSpec::on_side(Direction::East, 4, 9, 9),
            chest: TilePos::new(2, 2),
            entrance: TilePos::new(0, 4),
            hazards: ChunkHazards {
                spikes: vec![TilePos::new(5, 5)],
                electric: vec![ElectricHazard {
                    pos: TilePos::new(7, 0),
                    timer_ms: 3500,
                }],
                silver_doors: vec![SilverDoor {
                    pos: TilePos::new(4, 1),
                    opened: false,
                }],
                auto_gates: vec![AutoGate {
                    pos: TilePos::new(5, 1),
                    passed: false,
                    closed: false,
                }],
                air_tanks: vec![AirTank {
                    pos: TilePos::new(3, 3),
                    advanced: true,
                    collected: false,
                }],
                item_switch: Some(ItemSwitch {
                    pos: TilePos::new(2, 6),
                    reward: TilePos::new(6, 2),
                    triggered: false,
                }),
                ..ChunkHazards::default()
            },
            attempts: 1,
            fallback: false,
            chest_opened: false,
            door_unlocked: false,
            entrance_sealed: false,
        }
    }

    fn at(chunk: &Chunk, x: usize, y: usize) -> Located {
        let tile = TilePos::new(x, y);
        Located {
            chunk_index: chunk.index,
            slot: 0,
            tile,
            kind: chunk.tile(tile).unwrap(),
        }
    }

    #[test]
    fn test_solid_tiles_block() {
        let chunk = chunk();
        for (x, y) in [(0, 0), (1, 0), (6, 6)] {
            assert_eq!(check_step(&at(&chunk, x, y), &chunk, 9), StepCheck::Blocked(BlockReason::Solid));
        }
        assert!(check_step(&at(&chunk, 4, 4), &chunk, 0).is_open());
        assert!(check_step(&at(&chunk, 2, 2), &chunk, 0).is_open());
    }

    #[test]
    fn test_keyed_barriers() {
        let mut chunk = chunk();
        let silver = at(&chunk, 4, 1);
        let door = at(&chunk, 8, 4);
        assert_eq!(check_step(&silver, &chunk, 0), StepCheck::Blocked(BlockReason::NeedsKey));
        assert_eq!(check_step(&door, &chunk, 0), StepCheck::Blocked(BlockReason::NeedsKey));
        assert!(check_step(&silver, &chunk, 1).is_open());
        assert!(check_step(&door, &chunk, 1).is_open());

        chunk.open_silver_door(silver.tile);
        chunk.unlock_door();
        assert!(check_step(&silver, &chunk, 0).is_open());
        assert!(check_step(&door, &chunk, 0).is_open());
    }

    #[test]
    fn test_gate_and_sealed_entrance() {
        let mut chunk = chunk();
        let gate = at(&chunk, 5, 1);
        let entrance = at(&chunk, 0, 4);
        assert!(check_step(&gate, &chunk, 0).is_open());
        assert!(check_step(&entrance, &chunk, 0).is_open());

        chunk.update_gates(Some(gate.tile));
        chunk.update_gates(Some(TilePos::new(5, 2)));
        chunk.unlock_door();
        assert_eq!(check_step(&gate, &chunk, 0), StepCheck::Blocked(BlockReason::GateClosed));
        assert_eq!(check_step(&entrance, &chunk, 5), StepCheck::Blocked(BlockReason::EntranceSealed));
    }

    #[test]
    fn test_tile_effects() {
        let chunk = chunk();
        assert_eq!(effects_at(&at(&chunk, 2, 2), &chunk), vec![TileEffect::Key]);
        assert_eq!(effects_at(&at(&chunk, 3, 3), &chunk), vec![TileEffect::Oxygen(8)]);
        assert_eq!(effects_at(&at(&chunk, 5, 5), &chunk), vec![TileEffect::Spike]);
        assert_eq!(effects_at(&at(&chunk, 7, 1), &chunk), vec![TileEffect::Shock]);
        assert_eq!(effects_at(&at(&chunk, 2, 6), &chunk), vec![TileEffect::ItemSwitch]);
        assert_eq!(effects_at(&at(&chunk, 8, 4), &chunk), vec![TileEffect::Exit]);
        assert!(effects_at(&at(&chunk, 4, 4), &chunk).is_empty());
    }
}
