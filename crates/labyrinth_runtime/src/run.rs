//! # Maze Run
//!
//! Owns one endless run: the generation context, the active window, the
//! event channel and the input buffer. The host drives it from a single
//! update loop.
//!
//! ## Flow
//!
//! ```text
//! new()        -> opening chunk, ChunkCreated + HazardsSpawned
//! update()     -> aging, hazards, gates, destruction, game over
//! open_door()  -> key spent, next chunk chained, events in order
//! ```

use labyrinth_procedural::{
    ChainAnchor, Chunk, ChunkChainer, ChunkFactory, Direction, RunContext, TilePos, WorldPos,
};

use crate::config::RunConfig;
use crate::error::{ConfigResult, RunError, RunResult};
use crate::events::{EventChannel, MazeEvent};
use crate::input::InputBuffer;
use crate::locator::Located;
use crate::movement::{self, StepCheck};
use crate::pathfinder::{self, GridPathfinder};
use crate::window::{ChunkWindow, WindowReport};

/// Outcome of opening an exit door.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Chunk that was left.
    pub from: u64,
    /// Chunk that was created.
    pub to: u64,
    /// Side of `from` holding the door.
    pub exit_side: Direction,
    /// World offset of the new chunk.
    pub offset: WorldPos,
    /// World centre of the new entrance tile.
    pub entrance_world: WorldPos,
    /// The entrance had to be pulled off a corner.
    pub clamped: bool,
}

/// One endless run.
pub struct MazeRun {
    ctx: RunContext,
    factory: ChunkFactory,
    chainer: ChunkChainer,
    window: ChunkWindow,
    pathfinder: GridPathfinder,
    input: InputBuffer,
    events: EventChannel<MazeEvent>,
    spawn: WorldPos,
    over: bool,
}

impl MazeRun {
    /// Starts a run and builds its opening chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: RunConfig) -> ConfigResult<Self> {
        config.validate()?;
        let RunConfig {
            seed,
            tile_size,
            window,
            input,
            pathfinder,
            generation,
            progression,
        } = config;

        let mut ctx = seed.map_or_else(RunContext::random, RunContext::new);
        let factory = ChunkFactory::new(progression, generation);
        let opening = factory.opening_chunk(&mut ctx);
        let spawn = WorldPos::tile_center(WorldPos::default(), opening.entrance, tile_size);

        tracing::info!(
            seed = ctx.seed_base(),
            width = opening.width(),
            height = opening.height(),
            "run started"
        );

        let mut run = Self {
            ctx,
            factory,
            chainer: ChunkChainer::new(tile_size),
            window: ChunkWindow::new(window, tile_size),
            pathfinder: GridPathfinder::new(pathfinder),
            input: InputBuffer::new(input),
            events: EventChannel::unbounded(),
            spawn,
            over: false,
        };
        run.announce(&opening, WorldPos::default());
        run.window.push(opening, WorldPos::default());
        Ok(run)
    }

    /// Seed base of this run.
    #[must_use]
    pub fn seed_base(&self) -> &str {
        self.ctx.seed_base()
    }

    /// Chunks cleared so far.
    #[must_use]
    pub const fn cleared(&self) -> u32 {
        self.ctx.cleared()
    }

    /// World centre of the opening chunk's entrance.
    #[must_use]
    pub const fn spawn_point(&self) -> WorldPos {
        self.spawn
    }

    /// Returns true once the player has been swallowed by a destroyed chunk.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// The live window.
    #[must_use]
    pub const fn window(&self) -> &ChunkWindow {
        &self.window
    }

    /// Event channel for collaborators.
    #[must_use]
    pub const fn events(&self) -> &EventChannel<MazeEvent> {
        &self.events
    }

    /// Takes every pending event.
    pub fn drain_events(&self) -> Vec<MazeEvent> {
        self.events.drain()
    }

    /// Player input buffer.
    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    /// Tile under a world position.
    #[must_use]
    pub fn locate(&self, pos: WorldPos) -> Option<Located> {
        self.window.locate(pos)
    }

    /// Movement legality for a step onto `target`.
    #[must_use]
    pub fn check_step(&self, target: WorldPos, keys: u32) -> StepCheck {
        movement::check_world_step(&self.window, target, keys)
    }

    /// Next step for the pursuing agent: toward the nearest unopened chest
    /// or air tank, never through the player.
    #[must_use]
    pub fn pursuer_step(&self, agent: WorldPos, player: WorldPos) -> Option<Direction> {
        let start = self.window.global_tile(agent);
        let player = self.window.global_tile(player);
        self.pathfinder
            .step_toward_nearest(&self.window, start, Some(player), pathfinder::is_objective)
    }

    /// Live chunk with `index`, for pickups.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk is not in the window.
    pub fn chunk_mut(&mut self, index: u64) -> RunResult<&mut Chunk> {
        self.window
            .get_mut(index)
            .map(|active| &mut active.chunk)
            .ok_or(RunError::ChunkNotActive(index))
    }

    /// Empties a chest, returning true if a key was handed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk is not in the window.
    pub fn open_chest(&mut self, index: u64, tile: TilePos) -> RunResult<bool> {
        Ok(self.chunk_mut(index)?.take_key(tile))
    }

    /// Collects an air tank, returning the oxygen restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk is not in the window.
    pub fn collect_air_tank(&mut self, index: u64, tile: TilePos) -> RunResult<Option<u32>> {
        Ok(self.chunk_mut(index)?.collect_air_tank(tile))
    }

    /// Marks a silver door as opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk is not in the window.
    pub fn open_silver_door(&mut self, index: u64, tile: TilePos) -> RunResult<bool> {
        Ok(self.chunk_mut(index)?.open_silver_door(tile))
    }

    /// Opens the exit door of `index` with one of `keys` and chains the next
    /// chunk beyond it.
    ///
    /// Events are emitted as `ChunkCreated`, `HazardsSpawned`,
    /// `ChunkTransition`.
    ///
    /// # Errors
    ///
    /// Fails if the run is over, the chunk is not live, its door is already
    /// open, or no key is held. Nothing changes on failure.
    pub fn open_door(&mut self, index: u64, keys: &mut u32) -> RunResult<Transition> {
        if self.over {
            return Err(RunError::RunOver);
        }
        let active = self.window.get(index).ok_or(RunError::ChunkNotActive(index))?;
        if active.chunk.door_unlocked {
            return Err(RunError::DoorAlreadyOpen(index));
        }
        if *keys == 0 {
            return Err(RunError::NoKey);
        }
        let anchor = ChainAnchor::of(&active.chunk, active.offset);

        *keys -= 1;
        let progress = self.ctx.record_clear();
        if let Some(active) = self.window.get_mut(index) {
            active.chunk.unlock_door();
        }

        let ticket = self.ctx.next_ticket();
        let plan = self.factory.table().plan(progress, &mut ticket.rng("plan"));
        let next = self.chainer.chain(&self.factory, &anchor, &ticket, &plan);

        let tile_size = self.chainer.tile_size();
        let transition = Transition {
            from: index,
            to: next.chunk.index,
            exit_side: next.exit_side,
            offset: next.offset,
            entrance_world: WorldPos::tile_center(next.offset, next.chunk.entrance, tile_size),
            clamped: next.clamped,
        };

        self.announce(&next.chunk, next.offset);
        self.emit(MazeEvent::ChunkTransition {
            from: transition.from,
            to: transition.to,
            exit_side: transition.exit_side,
            door_world: next.door_world,
            entrance_world: transition.entrance_world,
        });
        self.window.push(next.chunk, next.offset);

        tracing::info!(
            from = transition.from,
            to = transition.to,
            cleared = progress,
            kind = ?plan.kind,
            "chunk transition"
        );
        Ok(transition)
    }

    /// Advances the window and emits what changed.
    ///
    /// Does nothing once the run is over.
    pub fn update(&mut self, delta_ms: u64, player: WorldPos) -> WindowReport {
        if self.over {
            return WindowReport::default();
        }
        let report = self.window.update(delta_ms, player);

        for &(index, tile) in &report.gates_closed {
            self.emit(MazeEvent::GateClosed { index, tile });
        }
        for &index in &report.faded {
            self.emit(MazeEvent::ChunkFading { index });
        }
        for gone in &report.destroyed {
            self.emit(MazeEvent::ChunkDestroyed {
                index: gone.index,
                offset: gone.offset,
                width: gone.width,
                height: gone.height,
            });
        }
        if let Some(index) = report.game_over {
            self.over = true;
            tracing::info!(index, cleared = self.ctx.cleared(), "game over");
            self.emit(MazeEvent::GameOver { index });
        }
        report
    }

    fn announce(&self, chunk: &Chunk, offset: WorldPos) {
        tracing::debug!(index = chunk.index, x = offset.x, y = offset.y, "chunk created");
        self.emit(MazeEvent::ChunkCreated {
            index: chunk.index,
            offset,
            chunk: Box::new(chunk.clone()),
        });
        self.emit(MazeEvent::HazardsSpawned {
            index: chunk.index,
            hazards: chunk.hazards.clone(),
        });
    }

    fn emit(&self, event: MazeEvent) {
        if let Err(err) = self.events.try_send(event) {
            tracing::warn!(event = err.into_inner().name(), "event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::BlockReason;

    fn run(seed: &str) -> MazeRun {
        MazeRun::new(RunConfig {
            seed: Some(seed.to_string()),
            ..RunConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_start_emits_opening_chunk() {
        let run = run("start");
        let names: Vec<&str> = run.drain_events().iter().map(MazeEvent::name).collect();
        assert_eq!(names, vec!["chunk_created", "hazards_spawned"]);
        assert_eq!(run.window().len(), 1);
        assert_eq!(run.seed_base(), "start");
        let spawn = run.locate(run.spawn_point()).unwrap();
        assert_eq!(spawn.chunk_index, 0);
        assert!(run.check_step(run.spawn_point(), 0).is_open());
    }

    #[test]
    fn test_open_door_event_order() {
        let mut run = run("order");
        run.drain_events();
        let mut keys = 1;
        let transition = run.open_door(0, &mut keys).unwrap();
        assert_eq!(keys, 0);
        assert_eq!(run.cleared(), 1);
        assert_eq!((transition.from, transition.to), (0, 1));

        let events = run.drain_events();
        let names: Vec<&str> = events.iter().map(MazeEvent::name).collect();
        assert_eq!(names, vec!["chunk_created", "hazards_spawned", "chunk_transition"]);
        match &events[2] {
            MazeEvent::ChunkTransition { door_world, entrance_world, .. } => {
                assert_eq!(entrance_world.x - door_world.x, 8);
                assert_eq!(entrance_world.y - door_world.y, 8);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_spawn_stays_walkable_after_first_door() {
        let mut run = run("spawn");
        let spawn = run.spawn_point();
        assert!(run.check_step(spawn, 0).is_open());
        let mut keys = 1;
        run.open_door(0, &mut keys).unwrap();
        assert!(!run.window().chunks()[0].chunk.entrance_sealed);
        assert!(run.check_step(spawn, 0).is_open());

        keys = 1;
        run.open_door(1, &mut keys).unwrap();
        let second = run.window().get(1).unwrap();
        let entrance = WorldPos::tile_center(second.offset, second.chunk.entrance, run.window().tile_size());
        assert_eq!(run.check_step(entrance, 1), StepCheck::Blocked(BlockReason::EntranceSealed));
    }

    #[test]
    fn test_open_door_errors() {
        let mut run = run("errors");
        let mut keys = 0;
        assert_eq!(run.open_door(0, &mut keys), Err(RunError::NoKey));
        assert_eq!(run.open_door(7, &mut keys), Err(RunError::ChunkNotActive(7)));
        keys = 2;
        run.open_door(0, &mut keys).unwrap();
        assert_eq!(run.open_door(0, &mut keys), Err(RunError::DoorAlreadyOpen(0)));
        assert_eq!(keys, 1);
    }

    #[test]
    fn test_pickups_through_run() {
        let mut run = run("pickups");
        let chest = run.window().chunks()[0].chunk.chest;
        assert_eq!(run.open_chest(0, chest), Ok(true));
        assert_eq!(run.open_chest(0, chest), Ok(false));
        assert_eq!(run.collect_air_tank(3, chest), Err(RunError::ChunkNotActive(3)));
        assert_eq!(run.open_silver_door(0, chest), Ok(false));
    }

    #[test]
    fn test_pursuer_heads_for_chest() {
        let run = run("pursuer");
        let chunk = &run.window().chunks()[0].chunk;
        let chest = chunk.chest;
        let next_to_chest = chunk
            .grid
            .neighbors(chest)
            .find(|&p| chunk.grid.is(p, labyrinth_procedural::TileKind::Floor))
            .unwrap();
        let agent = WorldPos::tile_center(WorldPos::default(), next_to_chest, 16);
        let step = run.pursuer_step(agent, run.spawn_point()).unwrap();
        let (dx, dy) = step.delta();
        assert_eq!(
            (next_to_chest.x as i64 + dx, next_to_chest.y as i64 + dy),
            (chest.x as i64, chest.y as i64)
        );
    }
}
