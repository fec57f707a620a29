//! # LABYRINTH Runtime
//!
//! The live side of an endless run: which chunks exist right now, what sits
//! under a world position, where the pursuing agent steps next, and how raw
//! key edges become one-tile moves.
//!
//! ## Design Principles
//!
//! 1. **Single owner**: One `MazeRun` per run, driven by the host's update step
//! 2. **Misses are blocked**: A position outside every live chunk is never an error
//! 3. **Ordered events**: `ChunkCreated` -> `HazardsSpawned` -> `ChunkTransition`
//! 4. **Bounded work**: Window size, search nodes and input queue all have caps
//!
//! ## Core Components
//!
//! - `ChunkWindow`: Aging, horizon destruction, single game-over report
//! - `Located` / `GlobalTile`: Oldest-first world position lookup
//! - `check_step` / `effects_at`: Movement legality and tile effects
//! - `GridPathfinder`: BFS first step with a greedy fallback
//! - `InputBuffer`: Time-windowed step intents with corner turning
//! - `MazeRun`: Ties it together and publishes `MazeEvent`s
//!
//! ## Example
//!
//! ```rust,ignore
//! use labyrinth_runtime::{MazeRun, RunConfig};
//!
//! let mut run = MazeRun::new(RunConfig::from_toml_str("seed = \"demo\"")?)?;
//! let mut keys = 0;
//! let player = run.spawn_point();
//!
//! loop {
//!     let report = run.update(16, player);
//!     for event in run.drain_events() {
//!         renderer.handle(event);
//!     }
//!     if run.is_over() {
//!         break;
//!     }
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod locator;
pub mod movement;
pub mod pathfinder;
pub mod run;
pub mod window;

pub use config::{PathfinderConfig, RunConfig, WindowConfig};
pub use error::{ConfigError, ConfigResult, RunError, RunResult};
pub use events::{EventChannel, MazeEvent};
pub use input::{BufferedInput, InputBuffer, InputConfig, Key};
pub use locator::{GlobalTile, Located};
pub use movement::{check_step, check_world_step, effects_at, BlockReason, StepCheck, TileEffect};
pub use pathfinder::{direction_between, is_objective, GridPathfinder};
pub use run::{MazeRun, Transition};
pub use window::{ActiveChunk, ChunkWindow, DestroyedChunk, WindowReport};
