//! # Chunk Factory
//!
//! Composes carving, feature placement and hazard placement into finished
//! chunks.
//!
//! ## Generation Loop
//!
//! 1. Seed a fresh `MazeRng` from the chunk seed
//! 2. Carve a fresh grid
//! 3. Place entrance, chest and door; validate reachability
//! 4. On failure, salt the seed (`_retry`) and start over
//! 5. After `max_attempts` failures, use the open-room fallback
//!
//! Each attempt owns its grid outright; nothing leaks between attempts.

use serde::{Deserialize, Serialize};

use crate::carver::MazeCarver;
use crate::chunk::Chunk;
use crate::features::{EntrancePlan, FeaturePlacer, PlacedLayout};
use crate::grid::odd_dimension;
use crate::hazards::{ChunkHazards, HazardPlacer};
use crate::progression::{ChunkKind, ChunkPlan, ChunkShape, ProgressionTable};
use crate::rng::{ChunkSeed, MazeRng};
use crate::run_context::{ChunkTicket, RunContext};
use crate::tile::{Direction, TileKind, TilePos};

/// Generation tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Carve attempts before the fallback layout is used.
    pub max_attempts: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { max_attempts: 32 }
    }
}

/// Layout plus how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLayout {
    /// The validated layout.
    pub layout: PlacedLayout,
    /// Seed of the successful attempt.
    pub seed: ChunkSeed,
    /// Attempts used.
    pub attempts: usize,
    /// The open-room fallback was used.
    pub fallback: bool,
}

/// Builds chunks from plans.
#[derive(Clone, Debug, Default)]
pub struct ChunkFactory {
    table: ProgressionTable,
    config: GenerationConfig,
}

impl ChunkFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(table: ProgressionTable, config: GenerationConfig) -> Self {
        Self { table, config }
    }

    /// Progression table in use.
    #[inline]
    #[must_use]
    pub fn table(&self) -> &ProgressionTable {
        &self.table
    }

    /// Generation settings in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> GenerationConfig {
        self.config
    }

    /// Odd-rounded dimensions the factory will actually build for `shape`.
    #[inline]
    #[must_use]
    pub const fn dimensions(shape: ChunkShape) -> (usize, usize) {
        (odd_dimension(shape.width), odd_dimension(shape.height))
    }

    /// Runs the bounded carve/place/validate loop.
    #[must_use]
    pub fn generate_layout(
        &self,
        seed: &ChunkSeed,
        shape: ChunkShape,
        entry: Direction,
        entrance: EntrancePlan,
    ) -> GeneratedLayout {
        let (width, height) = Self::dimensions(shape);
        let mut attempt_seed = seed.clone();

        for attempt in 1..=self.config.max_attempts {
            let mut rng = MazeRng::from_seed(&attempt_seed);
            let carved = MazeCarver::carve(width, height, &mut rng);
            if let Some(mut layout) = FeaturePlacer::place(carved, &mut rng, entry, entrance) {
                MazeCarver::add_detours(&mut layout.grid, &mut rng);
                return GeneratedLayout {
                    layout,
                    seed: attempt_seed,
                    attempts: attempt,
                    fallback: false,
                };
            }
            tracing::debug!(seed = %attempt_seed, attempt, "chunk layout rejected, reseeding");
            attempt_seed = attempt_seed.salted();
        }

        tracing::warn!(
            seed = %seed,
            attempts = self.config.max_attempts,
            "chunk generation exhausted retries, using open-room layout"
        );
        GeneratedLayout {
            layout: FeaturePlacer::fallback(width, height, entry, entrance),
            seed: seed.clone(),
            attempts: self.config.max_attempts,
            fallback: true,
        }
    }

    /// Builds a finished chunk: layout, then hazards.
    #[must_use]
    pub fn build(
        &self,
        ticket: &ChunkTicket,
        plan: &ChunkPlan,
        entry: Direction,
        entrance: EntrancePlan,
    ) -> Chunk {
        let generated = match plan.kind {
            ChunkKind::Reactor => {
                let (width, height) = Self::dimensions(plan.shape);
                GeneratedLayout {
                    layout: FeaturePlacer::fallback(width, height, entry, entrance),
                    seed: ticket.seed.clone(),
                    attempts: 1,
                    fallback: false,
                }
            }
            ChunkKind::Maze | ChunkKind::RestPoint => {
                self.generate_layout(&ticket.seed, plan.shape, entry, entrance)
            }
        };

        let GeneratedLayout {
            mut layout,
            seed,
            attempts,
            fallback,
        } = generated;

        let reactor = if plan.kind == ChunkKind::Reactor {
            place_reactor_core(&mut layout)
        } else {
            Vec::new()
        };

        let exclusion = layout.exclusion_zone();
        let mut rng = ticket.rng("hazards");
        let mut hazards = HazardPlacer::new(&mut layout.grid, &exclusion).place(&plan.hazards, &mut rng);
        hazards.reactor = reactor;

        tracing::debug!(
            index = ticket.index,
            seed = %seed,
            width = layout.grid.width(),
            height = layout.grid.height(),
            attempts,
            fallback,
            hazards = hazards.len(),
            "chunk built"
        );

        assemble(ticket.index, seed, plan.kind, layout, hazards, attempts, fallback)
    }

    /// Builds the first chunk of a run: stage-one shape, entered from the
    /// west, entrance somewhere inside.
    #[must_use]
    pub fn opening_chunk(&self, ctx: &mut RunContext) -> Chunk {
        let ticket = ctx.next_ticket();
        let plan = self.table.opening_plan(&mut ticket.rng("plan"));
        self.build(&ticket, &plan, Direction::West, EntrancePlan::Interior)
    }
}

/// Writes a 3x3 reactor core into the centre of an open layout.
///
/// Skipped when the chunk is too small or the core would cut the chest off
/// from the door or entrance.
fn place_reactor_core(layout: &mut PlacedLayout) -> Vec<TilePos> {
    let (width, height) = (layout.grid.width(), layout.grid.height());
    if width < 9 || height < 9 {
        return Vec::new();
    }
    let (cx, cy) = (width / 2, height / 2);
    let core: Vec<TilePos> = (cy - 1..=cy + 1)
        .flat_map(|y| (cx - 1..=cx + 1).map(move |x| TilePos::new(x, y)))
        .collect();

    let reserved = [layout.chest, layout.door.pos, layout.entrance];
    if core.iter().any(|p| reserved.contains(p)) {
        return Vec::new();
    }

    let mut grid = layout.grid.clone();
    for pos in &core {
        grid.set(*pos, TileKind::Reactor);
    }
    let walkable = |t: TileKind| t != TileKind::Wall && t != TileKind::Reactor;
    let seen = grid.flood(layout.chest, walkable);
    let reaches = |p: TilePos| seen[p.y * width + p.x];
    if !reaches(layout.door.pos) || !reaches(layout.entrance) {
        return Vec::new();
    }

    layout.grid = grid;
    core
}

fn assemble(
    index: u64,
    seed: ChunkSeed,
    kind: ChunkKind,
    layout: PlacedLayout,
    hazards: ChunkHazards,
    attempts: usize,
    fallback: bool,
) -> Chunk {
    Chunk {
        index,
        seed,
        kind,
        grid: layout.grid,
        entry: layout.entry,
        door: layout.door,
        chest: layout.chest,
        entrance: layout.entrance,
        hazards,
        attempts,
        fallback,
        chest_opened: false,
        door_unlocked: false,
        entrance_sealed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DoorSpec;

    #[test]
    fn test_chunk_generation_determinism() {
        let factory = ChunkFactory::default();
        let seed = ChunkSeed::new("abc");
        let shape = ChunkShape::square(13);
        let a = factory.generate_layout(&seed, shape, Direction::West, EntrancePlan::Interior);
        let b = factory.generate_layout(&seed, shape, Direction::West, EntrancePlan::Interior);
        assert_eq!(a.layout.grid.as_bytes(), b.layout.grid.as_bytes());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_different_mazes() {
        let factory = ChunkFactory::default();
        let shape = ChunkShape::square(13);
        let a = factory.generate_layout(&ChunkSeed::new("a"), shape, Direction::West, EntrancePlan::Interior);
        let b = factory.generate_layout(&ChunkSeed::new("b"), shape, Direction::West, EntrancePlan::Interior);
        assert_ne!(a.layout.grid, b.layout.grid);
    }

    #[test]
    fn test_odd_dimensions_enforced() {
        let factory = ChunkFactory::default();
        let generated = factory.generate_layout(
            &ChunkSeed::new("odd"),
            ChunkShape::rect(6, 8),
            Direction::North,
            EntrancePlan::Interior,
        );
        assert_eq!(generated.layout.grid.width(), 7);
        assert_eq!(generated.layout.grid.height(), 9);
    }

    #[test]
    fn test_zero_attempts_uses_fallback() {
        let factory = ChunkFactory::new(ProgressionTable::default(), GenerationConfig { max_attempts: 0 });
        let generated = factory.generate_layout(
            &ChunkSeed::new("never"),
            ChunkShape::square(9),
            Direction::East,
            EntrancePlan::Boundary(DoorSpec::on_side(Direction::East, 4, 9, 9).pos),
        );
        assert!(generated.fallback);
        let layout = &generated.layout;
        assert_ne!(layout.door.side, Direction::East);
        assert!(layout.grid.is_reachable(layout.chest, layout.door.pos));
    }

    #[test]
    fn test_built_chunks_keep_invariants() {
        let factory = ChunkFactory::default();
        let mut ctx = RunContext::new("inv");
        for progress in 0..40 {
            let ticket = ctx.next_ticket();
            let plan = factory.table().plan(progress, &mut ticket.rng("plan"));
            let chunk = factory.build(&ticket, &plan, Direction::South, EntrancePlan::Interior);
            assert_ne!(chunk.door.side, chunk.entry);
            assert!(chunk.grid.is_reachable(chunk.chest, chunk.door.pos));
            assert!(!chunk.chest.is_near(chunk.door.pos));
            assert!(!chunk.chest.is_near(chunk.entrance));
            assert!(!chunk.entrance.is_near(chunk.door.pos));
            assert_eq!(chunk.index, u64::from(progress));
            assert_eq!(chunk.grid.width() % 2, 1);
            assert_eq!(chunk.grid.height() % 2, 1);
        }
    }

    #[test]
    fn test_reactor_arena() {
        let factory = ChunkFactory::default();
        let mut ctx = RunContext::new("boss");
        let ticket = ctx.next_ticket();
        let plan = factory.table().plan(32, &mut ticket.rng("plan"));
        let entrance = DoorSpec::on_side(Direction::West, 6, 13, 13).pos;
        let chunk = factory.build(&ticket, &plan, Direction::West, EntrancePlan::Boundary(entrance));
        assert_eq!(chunk.kind, ChunkKind::Reactor);
        assert_eq!(chunk.hazards.reactor.len(), 9);
        assert_eq!(chunk.tile(TilePos::new(6, 6)), Some(TileKind::Reactor));
        assert!(chunk.grid.is_reachable(chunk.entrance, chunk.door.pos));
    }

    #[test]
    fn test_opening_chunk() {
        let factory = ChunkFactory::default();
        let mut ctx = RunContext::new("open");
        let chunk = factory.opening_chunk(&mut ctx);
        assert_eq!(chunk.index, 0);
        assert_eq!(chunk.entry, Direction::West);
        assert_eq!((chunk.width(), chunk.height()), (7, 7));
        assert!(chunk.grid.is_interior(chunk.entrance));
        assert!(chunk.grid.is(chunk.entrance, TileKind::Floor));
        if let Some(console) = chunk.hazards.oxygen_console {
            assert_eq!(chunk.tile(console), Some(TileKind::Special));
        }
    }
}
