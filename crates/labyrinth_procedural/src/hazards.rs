//! # Hazards
//!
//! Secondary chunk content placed after the chest/door layout is final:
//! spikes, electric machines, silver doors, auto-gates, air tanks, the item
//! switch and the oxygen console.
//!
//! Every placer picks from the tiles that are valid *right now* and skips the
//! one-tile neighbourhood (diagonals included) of the entrance and the door.
//! A placer that finds no candidate places nothing.

use crate::grid::TileGrid;
use crate::rng::MazeRng;
use crate::tile::{Direction, TileKind, TilePos};

/// Length of one electric machine cycle.
pub const ELECTRIC_CYCLE_MS: u64 = 4000;

/// Cycle time from which a machine discharges.
pub const ELECTRIC_ACTIVE_FROM_MS: u64 = 3000;

/// Oxygen restored by a regular air tank.
pub const AIR_TANK_OXYGEN: u32 = 5;

/// Oxygen restored by an advanced air tank.
pub const ADVANCED_AIR_TANK_OXYGEN: u32 = 8;

/// Wall-mounted machine that periodically electrifies adjacent floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElectricHazard {
    /// Wall tile holding the machine.
    pub pos: TilePos,
    /// Time into the current cycle.
    pub timer_ms: u64,
}

impl ElectricHazard {
    /// Advances the cycle timer.
    #[inline]
    pub fn tick(&mut self, delta_ms: u64) {
        self.timer_ms = (self.timer_ms + delta_ms) % ELECTRIC_CYCLE_MS;
    }

    /// Returns true while discharging.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.timer_ms >= ELECTRIC_ACTIVE_FROM_MS
    }
}

/// Barrier that stays open until passed, then closes for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoGate {
    /// Gate tile.
    pub pos: TilePos,
    /// The player has stood on the gate.
    pub passed: bool,
    /// The gate is shut and blocks movement.
    pub closed: bool,
}

/// Barrier passable while a key is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SilverDoor {
    /// Door tile.
    pub pos: TilePos,
    /// Visual state: already walked through once.
    pub opened: bool,
}

/// Oxygen pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AirTank {
    /// Tank tile.
    pub pos: TilePos,
    /// Advanced tanks restore more oxygen.
    pub advanced: bool,
    /// Already picked up.
    pub collected: bool,
}

impl AirTank {
    /// Oxygen this tank restores.
    #[inline]
    #[must_use]
    pub const fn oxygen(&self) -> u32 {
        if self.advanced {
            ADVANCED_AIR_TANK_OXYGEN
        } else {
            AIR_TANK_OXYGEN
        }
    }
}

/// Floor switch that reveals an extra key chest when stepped on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSwitch {
    /// Switch tile (stays floor).
    pub pos: TilePos,
    /// Floor tile that becomes an item chest.
    pub reward: TilePos,
    /// Already stepped on.
    pub triggered: bool,
}

/// Kind of a single barrier tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarrierKind {
    /// Silver door.
    SilverDoor,
    /// Auto-gate, optionally shut from the start.
    AutoGate {
        /// Starts closed.
        closed: bool,
    },
}

/// Concrete hazard content for one chunk. All rolls already resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HazardPlan {
    /// One entry per barrier tile.
    pub barriers: Vec<BarrierKind>,
    /// Air tank, `Some(advanced)` when present.
    pub air_tank: Option<bool>,
    /// Number of spikes.
    pub spikes: usize,
    /// Number of electric machines.
    pub electric_machines: usize,
    /// Whether an item switch is placed.
    pub item_switch: bool,
    /// Whether an oxygen console is placed.
    pub oxygen_console: bool,
}

impl HazardPlan {
    /// A plan with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the plan places nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.barriers.is_empty()
            && self.air_tank.is_none()
            && self.spikes == 0
            && self.electric_machines == 0
            && !self.item_switch
            && !self.oxygen_console
    }
}

/// Hazard records of one chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkHazards {
    /// Spike tiles (floor).
    pub spikes: Vec<TilePos>,
    /// Electric machines (wall).
    pub electric: Vec<ElectricHazard>,
    /// Silver doors.
    pub silver_doors: Vec<SilverDoor>,
    /// Auto-gates.
    pub auto_gates: Vec<AutoGate>,
    /// Air tanks.
    pub air_tanks: Vec<AirTank>,
    /// Item switch.
    pub item_switch: Option<ItemSwitch>,
    /// Oxygen console (SPECIAL tile).
    pub oxygen_console: Option<TilePos>,
    /// Reactor core tiles.
    pub reactor: Vec<TilePos>,
}

impl ChunkHazards {
    /// Total number of hazard records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spikes.len()
            + self.electric.len()
            + self.silver_doors.len()
            + self.auto_gates.len()
            + self.air_tanks.len()
            + usize::from(self.item_switch.is_some())
            + usize::from(self.oxygen_console.is_some())
            + self.reactor.len()
    }

    /// Returns true if the chunk has no hazards at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Places hazards on a finished layout.
pub struct HazardPlacer<'a> {
    grid: &'a mut TileGrid,
    exclusion: Vec<TilePos>,
    taken: Vec<TilePos>,
}

impl<'a> HazardPlacer<'a> {
    /// Creates a placer that keeps clear of every tile in `exclusion`.
    #[must_use]
    pub fn new(grid: &'a mut TileGrid, exclusion: &[TilePos]) -> Self {
        Self {
            grid,
            exclusion: exclusion.to_vec(),
            taken: Vec::new(),
        }
    }

    /// Places everything in `plan`, writing tiles into the grid.
    pub fn place(mut self, plan: &HazardPlan, rng: &mut MazeRng) -> ChunkHazards {
        let mut hazards = ChunkHazards::default();

        for barrier in &plan.barriers {
            let Some(pos) = self.pick(rng, Self::is_door_candidate) else {
                break;
            };
            match *barrier {
                BarrierKind::SilverDoor => {
                    self.grid.set(pos, TileKind::SilverDoor);
                    hazards.silver_doors.push(SilverDoor { pos, opened: false });
                }
                BarrierKind::AutoGate { closed } => {
                    self.grid.set(pos, TileKind::AutoGate);
                    hazards.auto_gates.push(AutoGate {
                        pos,
                        passed: closed,
                        closed,
                    });
                }
            }
        }

        if let Some(advanced) = plan.air_tank {
            if let Some(pos) = self.pick(rng, Self::is_free_floor) {
                self.grid.set(pos, TileKind::Oxygen);
                hazards.air_tanks.push(AirTank {
                    pos,
                    advanced,
                    collected: false,
                });
            }
        }

        for _ in 0..plan.spikes {
            if let Some(pos) = self.pick(rng, Self::is_free_floor) {
                hazards.spikes.push(pos);
            }
        }

        for _ in 0..plan.electric_machines {
            if let Some(pos) = self.pick(rng, Self::is_mount_wall) {
                hazards.electric.push(ElectricHazard { pos, timer_ms: 0 });
            }
        }

        if plan.item_switch {
            if let (Some(pos), Some(reward)) = (
                self.pick(rng, Self::is_free_floor),
                self.pick(rng, Self::is_free_floor),
            ) {
                hazards.item_switch = Some(ItemSwitch {
                    pos,
                    reward,
                    triggered: false,
                });
            }
        }

        if plan.oxygen_console {
            if let Some(pos) = self.pick(rng, Self::is_mount_wall) {
                self.grid.set(pos, TileKind::Special);
                hazards.oxygen_console = Some(pos);
            }
        }

        hazards
    }

    /// Picks a random candidate and marks it taken.
    fn pick(&mut self, rng: &mut MazeRng, accept: fn(&TileGrid, TilePos) -> bool) -> Option<TilePos> {
        let grid: &TileGrid = self.grid;
        let (width, height) = (grid.width(), grid.height());
        let candidates: Vec<TilePos> = (1..height.saturating_sub(1))
            .flat_map(|y| (1..width.saturating_sub(1)).map(move |x| TilePos::new(x, y)))
            .filter(|p| !self.taken.contains(p))
            .filter(|p| !self.exclusion.iter().any(|e| e.is_near(*p)))
            .filter(|p| accept(grid, *p))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pos = candidates[rng.next_int(candidates.len())];
        self.taken.push(pos);
        Some(pos)
    }

    fn is_free_floor(grid: &TileGrid, pos: TilePos) -> bool {
        grid.is(pos, TileKind::Floor)
    }

    /// Interior wall with floor on at least one side.
    fn is_mount_wall(grid: &TileGrid, pos: TilePos) -> bool {
        grid.is(pos, TileKind::Wall) && grid.neighbors(pos).any(|n| grid.is(n, TileKind::Floor))
    }

    /// Wall sitting in a straight corridor: floor on both sides along one
    /// axis, wall on both sides along the other.
    fn is_door_candidate(grid: &TileGrid, pos: TilePos) -> bool {
        if !grid.is(pos, TileKind::Wall) {
            return false;
        }
        let open = |p: Option<TilePos>| p.is_some_and(|p| grid.is(p, TileKind::Floor));
        let wall = |p: Option<TilePos>| p.is_some_and(|p| grid.is(p, TileKind::Wall));
        let (n, e, s, w) = (
            pos.step(Direction::North),
            pos.step(Direction::East),
            pos.step(Direction::South),
            pos.step(Direction::West),
        );
        (open(e) && open(w) && wall(n) && wall(s)) || (open(n) && open(s) && wall(e) && wall(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carver::MazeCarver;
    use crate::rng::ChunkSeed;

    fn maze(seed: &str) -> TileGrid {
        let mut rng = MazeRng::from_seed(&ChunkSeed::new(seed));
        MazeCarver::carve(13, 13, &mut rng).grid
    }

    fn full_plan() -> HazardPlan {
        HazardPlan {
            barriers: vec![
                BarrierKind::SilverDoor,
                BarrierKind::AutoGate { closed: false },
                BarrierKind::AutoGate { closed: true },
            ],
            air_tank: Some(true),
            spikes: 2,
            electric_machines: 2,
            item_switch: true,
            oxygen_console: true,
        }
    }

    #[test]
    fn test_electric_cycle() {
        let mut machine = ElectricHazard {
            pos: TilePos::new(2, 2),
            timer_ms: 0,
        };
        machine.tick(2999);
        assert!(!machine.is_active());
        machine.tick(1);
        assert!(machine.is_active());
        machine.tick(1000);
        assert!(!machine.is_active());
        assert_eq!(machine.timer_ms, 0);
    }

    #[test]
    fn test_full_plan_places_everything() {
        let mut grid = maze("hazard-full");
        let mut rng = MazeRng::from_u32(5);
        let hazards = HazardPlacer::new(&mut grid, &[]).place(&full_plan(), &mut rng);
        assert_eq!(hazards.silver_doors.len(), 1);
        assert_eq!(hazards.auto_gates.len(), 2);
        assert!(hazards.auto_gates[1].closed);
        assert_eq!(hazards.air_tanks.len(), 1);
        assert_eq!(hazards.air_tanks[0].oxygen(), ADVANCED_AIR_TANK_OXYGEN);
        assert_eq!(hazards.spikes.len(), 2);
        assert_eq!(hazards.electric.len(), 2);
        assert!(hazards.item_switch.is_some());
        let console = hazards.oxygen_console.unwrap();
        assert!(grid.is(console, TileKind::Special));
        assert!(grid.is(hazards.air_tanks[0].pos, TileKind::Oxygen));
    }

    #[test]
    fn test_exclusion_zone_respected() {
        for i in 0..40 {
            let mut grid = maze(&format!("excl-{i}"));
            let keep_clear = [TilePos::new(1, 1), TilePos::new(11, 11), TilePos::new(6, 6)];
            let mut rng = MazeRng::from_u32(i);
            let hazards = HazardPlacer::new(&mut grid, &keep_clear).place(&full_plan(), &mut rng);
            let mut all: Vec<TilePos> = hazards.spikes.clone();
            all.extend(hazards.electric.iter().map(|h| h.pos));
            all.extend(hazards.silver_doors.iter().map(|h| h.pos));
            all.extend(hazards.auto_gates.iter().map(|h| h.pos));
            all.extend(hazards.air_tanks.iter().map(|h| h.pos));
            all.extend(hazards.oxygen_console);
            for pos in all {
                assert!(keep_clear.iter().all(|c| !c.is_near(pos)), "{pos:?} too close");
            }
        }
    }

    #[test]
    fn test_barriers_sit_in_corridors() {
        let mut grid = maze("corridor");
        let before = grid.clone();
        let mut rng = MazeRng::from_u32(11);
        let plan = HazardPlan {
            barriers: vec![BarrierKind::SilverDoor; 3],
            ..HazardPlan::empty()
        };
        let hazards = HazardPlacer::new(&mut grid, &[]).place(&plan, &mut rng);
        for door in &hazards.silver_doors {
            assert!(before.is(door.pos, TileKind::Wall));
            assert!(HazardPlacer::is_door_candidate(&before, door.pos));
        }
    }

    #[test]
    fn test_empty_plan_changes_nothing() {
        let mut grid = maze("nothing");
        let before = grid.clone();
        let mut rng = MazeRng::from_u32(1);
        assert!(HazardPlan::empty().is_empty());
        let hazards = HazardPlacer::new(&mut grid, &[]).place(&HazardPlan::empty(), &mut rng);
        assert!(hazards.is_empty());
        assert_eq!(grid, before);
    }
}
