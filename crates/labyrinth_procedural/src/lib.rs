//! # LABYRINTH Procedural Generation
//!
//! Deterministic maze chunks that chain into an endless corridor.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same chunk
//! 2. **Bounded**: Regeneration is capped; a connected fallback always exists
//! 3. **Value semantics**: Every generation attempt builds a fresh grid
//! 4. **Explicit state**: Run-wide counters live in a `RunContext` value
//!
//! ## Core Components
//!
//! - `MazeRng`: 32-bit LCG seeded from a string hash
//! - `MazeCarver`: Depth-first backtracker over a stride-2 lattice
//! - `FeaturePlacer`: Chest/door/entrance placement with reachability checks
//! - `HazardPlacer`: Spikes, machines, barriers, pickups
//! - `ProgressionTable`: Progress -> chunk shape and hazard content
//! - `ChunkFactory`: Bounded carve/place/validate loop
//! - `ChunkChainer`: Offset math gluing each chunk to its predecessor's door
//!
//! ## Example
//!
//! ```rust,ignore
//! use labyrinth_procedural::{ChainAnchor, ChunkChainer, ChunkFactory, RunContext, WorldPos};
//!
//! let factory = ChunkFactory::default();
//! let chainer = ChunkChainer::new(16);
//! let mut ctx = RunContext::new("seed");
//!
//! let first = factory.opening_chunk(&mut ctx);
//! let ticket = ctx.next_ticket();
//! let plan = factory.table().plan(ctx.record_clear(), &mut ticket.rng("plan"));
//! let next = chainer.chain(&factory, &ChainAnchor::of(&first, WorldPos::default()), &ticket, &plan);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod carver;
pub mod chainer;
pub mod chunk;
pub mod error;
pub mod factory;
pub mod features;
pub mod grid;
pub mod hazards;
pub mod progression;
pub mod rng;
pub mod run_context;
pub mod tile;

pub use carver::{CarvedMaze, MazeCarver};
pub use chainer::{ChainAnchor, ChainPlacement, ChainedChunk, ChunkChainer};
pub use chunk::{Chunk, WorldPos};
pub use error::{ProgressionError, ProgressionResult};
pub use factory::{ChunkFactory, GeneratedLayout, GenerationConfig};
pub use features::{DoorSpec, EntrancePlan, FeaturePlacer, PlacedLayout};
pub use grid::{odd_dimension, TileGrid, MIN_DIMENSION};
pub use hazards::{
    AirTank, AutoGate, BarrierKind, ChunkHazards, ElectricHazard, HazardPlacer, HazardPlan, ItemSwitch,
    SilverDoor,
};
pub use progression::{ChunkKind, ChunkPlan, ChunkShape, HazardSchedule, ProgressionTable, SizeGating, Stage};
pub use rng::{ChunkSeed, MazeRng};
pub use run_context::{ChunkTicket, RunContext};
pub use tile::{Direction, TileKind, TilePos};
