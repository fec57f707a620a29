//! # Progression Table
//!
//! Pure mapping from the "chunks cleared" counter to the next chunk's kind,
//! shape and hazard content.
//!
//! The table is data: it deserializes from TOML and can be swapped without
//! touching the generation algorithms. Missing fields fall back to the
//! built-in table.
//!
//! ```toml
//! rest_points = [14, 29]
//! reactor_at = 32
//!
//! [[stages]]
//! stage = 1
//! shapes = [{ width = 7, height = 7 }]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, ProgressionResult};
use crate::grid::MIN_DIMENSION;
use crate::hazards::{BarrierKind, HazardPlan};
use crate::rng::MazeRng;

/// Width and height of a chunk, in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkShape {
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
}

impl ChunkShape {
    /// Square shape.
    #[inline]
    #[must_use]
    pub const fn square(size: usize) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Rectangular shape.
    #[inline]
    #[must_use]
    pub const fn rect(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns true for square shapes.
    #[inline]
    #[must_use]
    pub const fn is_square(self) -> bool {
        self.width == self.height
    }
}

/// Shapes unlocked at a stage (and every later one).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// First stage at which these shapes appear.
    pub stage: u32,
    /// Shapes added to the pool.
    pub shapes: Vec<ChunkShape>,
}

/// What kind of chunk to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkKind {
    /// Regular maze.
    Maze,
    /// Small calm maze with an oxygen console.
    RestPoint,
    /// Open arena around a reactor core.
    Reactor,
}

/// Size gating for square shapes in the early game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeGating {
    /// Below this progress, squares must be smaller than `large_size`.
    pub small_until: u32,
    /// Below this progress, squares may be at most `large_size`.
    pub medium_until: u32,
    /// Square size the gates are measured against.
    pub large_size: usize,
    /// From this progress on, only the largest square is used.
    pub largest_from: u32,
}

impl Default for SizeGating {
    fn default() -> Self {
        Self {
            small_until: 6,
            medium_until: 9,
            large_size: 11,
            largest_from: 30,
        }
    }
}

/// Progress thresholds and odds for hazard content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardSchedule {
    /// First progress with barriers and an air tank.
    pub barriers_from: u32,
    /// First progress where auto-gates may replace silver doors.
    pub auto_gates_from: u32,
    /// First progress with 1-3 mixed barriers.
    pub mixed_barriers_from: u32,
    /// Progress values that get three pre-closed auto-gates.
    pub sealed_gates_at: Vec<u32>,
    /// Chunks at least this large may get a second barrier.
    pub double_barrier_size: usize,
    /// First progress where tanks may be advanced.
    pub advanced_tank_from: u32,
    /// Odds of an advanced tank.
    pub advanced_tank_chance: f64,
    /// First progress with spikes.
    pub spikes_from: u32,
    /// Maximum spikes per chunk.
    pub max_spikes: usize,
    /// Progress with a guaranteed electric machine.
    pub electric_from: u32,
    /// Odds of a machine after `electric_from`.
    pub electric_chance: f64,
    /// First progress with extra machines.
    pub extra_electric_from: u32,
    /// Odds of each extra machine.
    pub extra_electric_chances: Vec<f64>,
    /// Progress with a guaranteed item switch.
    pub item_switch_from: u32,
    /// Odds of an item switch after `item_switch_from`.
    pub item_switch_chance: f64,
}

impl Default for HazardSchedule {
    fn default() -> Self {
        Self {
            barriers_from: 1,
            auto_gates_from: 10,
            mixed_barriers_from: 19,
            sealed_gates_at: vec![30, 31],
            double_barrier_size: 11,
            advanced_tank_from: 4,
            advanced_tank_chance: 0.1,
            spikes_from: 2,
            max_spikes: 2,
            electric_from: 15,
            electric_chance: 0.6,
            extra_electric_from: 20,
            extra_electric_chances: vec![0.8, 0.1],
            item_switch_from: 20,
            item_switch_chance: 0.3,
        }
    }
}

/// Everything needed to build the next chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkPlan {
    /// Kind of chunk.
    pub kind: ChunkKind,
    /// Requested shape.
    pub shape: ChunkShape,
    /// Hazard content.
    pub hazards: HazardPlan,
}

/// Progress-indexed chunk table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTable {
    /// Shape pools by stage.
    pub stages: Vec<Stage>,
    /// Square-size gating.
    pub gating: SizeGating,
    /// Progress values that produce a rest point.
    pub rest_points: Vec<u32>,
    /// Shape of rest points.
    pub rest_shape: ChunkShape,
    /// Progress value that produces the reactor arena.
    pub reactor_at: Option<u32>,
    /// Shape of the reactor arena.
    pub reactor_shape: ChunkShape,
    /// Hazard thresholds.
    pub hazards: HazardSchedule,
}

impl Default for ProgressionTable {
    fn default() -> Self {
        Self {
            stages: vec![
                Stage {
                    stage: 1,
                    shapes: vec![ChunkShape::square(7)],
                },
                Stage {
                    stage: 2,
                    shapes: vec![
                        ChunkShape::square(7),
                        ChunkShape::square(9),
                        ChunkShape::square(11),
                        ChunkShape::square(13),
                    ],
                },
                Stage {
                    stage: 12,
                    shapes: vec![ChunkShape::rect(5, 13)],
                },
                Stage {
                    stage: 22,
                    shapes: vec![ChunkShape::rect(7, 13)],
                },
            ],
            gating: SizeGating::default(),
            rest_points: vec![14, 29],
            rest_shape: ChunkShape::square(7),
            reactor_at: Some(32),
            reactor_shape: ChunkShape::square(13),
            hazards: HazardSchedule::default(),
        }
    }
}

impl ProgressionTable {
    /// Parses and validates a table from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(source: &str) -> ProgressionResult<Self> {
        let table: Self = toml::from_str(source)?;
        table.validate()?;
        Ok(table)
    }

    /// Checks structural rules the generators rely on.
    ///
    /// # Errors
    ///
    /// Returns the first rule violation found.
    pub fn validate(&self) -> ProgressionResult<()> {
        if self.stages.is_empty() {
            return Err(ProgressionError::EmptyTable);
        }
        for stage in &self.stages {
            if stage.shapes.is_empty() {
                return Err(ProgressionError::EmptyStage(stage.stage));
            }
        }
        let shapes = self
            .stages
            .iter()
            .flat_map(|s| s.shapes.iter())
            .chain([&self.rest_shape, &self.reactor_shape]);
        for shape in shapes {
            if shape.width < MIN_DIMENSION || shape.height < MIN_DIMENSION {
                return Err(ProgressionError::ShapeTooSmall {
                    width: shape.width,
                    height: shape.height,
                    min: MIN_DIMENSION,
                });
            }
        }
        let h = &self.hazards;
        let chances = [
            ("advanced_tank_chance", h.advanced_tank_chance),
            ("electric_chance", h.electric_chance),
            ("item_switch_chance", h.item_switch_chance),
        ]
        .into_iter()
        .chain(h.extra_electric_chances.iter().map(|c| ("extra_electric_chances", *c)));
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProgressionError::ChanceOutOfRange {
                    name,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Kind of chunk produced at `progress`.
    #[must_use]
    pub fn kind_at(&self, progress: u32) -> ChunkKind {
        if self.reactor_at == Some(progress) {
            ChunkKind::Reactor
        } else if self.rest_points.contains(&progress) {
            ChunkKind::RestPoint
        } else {
            ChunkKind::Maze
        }
    }

    /// Picks a shape for `stage` with the early-game size gates applied.
    #[must_use]
    pub fn pick_shape(&self, stage: u32, progress: u32, rng: &mut MazeRng) -> ChunkShape {
        let pool: Vec<ChunkShape> = self
            .stages
            .iter()
            .filter(|s| s.stage <= stage)
            .flat_map(|s| s.shapes.iter().copied())
            .collect();

        let gating = &self.gating;
        if progress >= gating.largest_from {
            if let Some(largest) = pool.iter().filter(|s| s.is_square()).max_by_key(|s| s.width) {
                return *largest;
            }
        }

        let allowed: Vec<ChunkShape> = pool
            .iter()
            .copied()
            .filter(|s| {
                !s.is_square()
                    || if progress < gating.small_until {
                        s.width < gating.large_size
                    } else if progress < gating.medium_until {
                        s.width <= gating.large_size
                    } else {
                        true
                    }
            })
            .collect();

        if allowed.is_empty() {
            return self
                .stages
                .iter()
                .min_by_key(|s| s.stage)
                .and_then(|s| s.shapes.first().copied())
                .unwrap_or(ChunkShape::square(MIN_DIMENSION));
        }
        allowed[rng.next_int(allowed.len())]
    }

    /// Plan for the opening chunk of a run.
    #[must_use]
    pub fn opening_plan(&self, rng: &mut MazeRng) -> ChunkPlan {
        ChunkPlan {
            kind: ChunkKind::Maze,
            shape: self.pick_shape(1, 0, rng),
            hazards: HazardPlan {
                oxygen_console: true,
                ..HazardPlan::empty()
            },
        }
    }

    /// Plan for the chunk entered after clearing `progress` chunks.
    #[must_use]
    pub fn plan(&self, progress: u32, rng: &mut MazeRng) -> ChunkPlan {
        match self.kind_at(progress) {
            ChunkKind::RestPoint => ChunkPlan {
                kind: ChunkKind::RestPoint,
                shape: self.rest_shape,
                hazards: HazardPlan {
                    oxygen_console: true,
                    ..HazardPlan::empty()
                },
            },
            ChunkKind::Reactor => ChunkPlan {
                kind: ChunkKind::Reactor,
                shape: self.reactor_shape,
                hazards: HazardPlan::empty(),
            },
            ChunkKind::Maze => {
                let shape = self.pick_shape(progress + 1, progress, rng);
                let hazards = self.hazard_plan(progress, shape, rng);
                ChunkPlan {
                    kind: ChunkKind::Maze,
                    shape,
                    hazards,
                }
            }
        }
    }

    /// Resolves every hazard roll for a maze chunk.
    #[must_use]
    pub fn hazard_plan(&self, progress: u32, shape: ChunkShape, rng: &mut MazeRng) -> HazardPlan {
        let s = &self.hazards;
        let mut plan = HazardPlan::empty();

        if progress >= s.barriers_from {
            let size = shape.width.min(shape.height);
            let count = if size >= s.double_barrier_size && rng.chance(0.5) {
                2
            } else {
                1
            };

            plan.barriers = if s.sealed_gates_at.contains(&progress) {
                vec![BarrierKind::AutoGate { closed: true }; 3]
            } else if progress >= s.mixed_barriers_from {
                (0..rng.next_range(1, 3))
                    .map(|_| {
                        if rng.chance(0.5) {
                            BarrierKind::SilverDoor
                        } else {
                            BarrierKind::AutoGate { closed: false }
                        }
                    })
                    .collect()
            } else if progress >= s.auto_gates_from {
                let kind = if progress == s.auto_gates_from || !rng.chance(0.5) {
                    BarrierKind::AutoGate { closed: false }
                } else {
                    BarrierKind::SilverDoor
                };
                vec![kind; count]
            } else {
                vec![BarrierKind::SilverDoor; count]
            };

            let advanced = progress >= s.advanced_tank_from && rng.chance(s.advanced_tank_chance);
            plan.air_tank = Some(advanced);
        }

        if progress >= s.spikes_from {
            plan.spikes = rng.next_range(0, s.max_spikes);

            let mut machines = usize::from(
                progress == s.electric_from || (progress > s.electric_from && rng.chance(s.electric_chance)),
            );
            if progress >= s.extra_electric_from {
                for chance in &s.extra_electric_chances {
                    machines += usize::from(rng.chance(*chance));
                }
            }
            plan.electric_machines = machines;
        }

        plan.item_switch = progress >= s.item_switch_from
            && (progress == s.item_switch_from || rng.chance(s.item_switch_chance));

        plan
    }
}
