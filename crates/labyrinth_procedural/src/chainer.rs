//! # Chunk Chaining
//!
//! Places the next chunk flush against the predecessor's exit door.
//!
//! ## Geometry
//!
//! The two chunks share the boundary line that holds the door: the new
//! chunk's entry-side perimeter lies on top of the predecessor's door-side
//! perimeter. The entrance tile therefore occupies the same world tile as
//! the predecessor's door, and the new chunk's first interior tile is one
//! tile beyond it.
//!
//! ```text
//!   predecessor (E door)      next chunk (entry W)
//!   # # # # #
//!   # . . . D  <- shared ->  E . . . #
//!   # # # # #
//! ```
//!
//! The cross-axis offset is chosen so door and entrance are colinear. When
//! the door coordinate would land on (or past) a corner of a smaller
//! successor, the entrance is clamped to `[1, n-2]` and the cross offset is
//! shifted to keep them colinear.

use crate::chunk::{Chunk, WorldPos};
use crate::factory::ChunkFactory;
use crate::features::{DoorSpec, EntrancePlan};
use crate::progression::{ChunkPlan, ChunkShape};
use crate::run_context::ChunkTicket;
use crate::tile::{Direction, TilePos};

/// The parts of a predecessor chunk chaining depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainAnchor {
    /// Predecessor exit door.
    pub door: DoorSpec,
    /// Predecessor world offset.
    pub offset: WorldPos,
    /// Predecessor width in tiles.
    pub width: usize,
    /// Predecessor height in tiles.
    pub height: usize,
}

impl ChainAnchor {
    /// Anchor for `chunk` placed at `offset`.
    #[must_use]
    pub const fn of(chunk: &Chunk, offset: WorldPos) -> Self {
        Self {
            door: chunk.door,
            offset,
            width: chunk.width(),
            height: chunk.height(),
        }
    }

    /// World corner of the door tile.
    #[must_use]
    pub const fn door_world(&self, tile_size: i64) -> WorldPos {
        WorldPos::of_tile(self.offset, self.door.pos, tile_size)
    }
}

/// Where the next chunk goes, before it is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainPlacement {
    /// Entry side of the new chunk.
    pub entry: Direction,
    /// Entrance tile of the new chunk.
    pub entrance: TilePos,
    /// World offset of the new chunk.
    pub offset: WorldPos,
    /// The entrance had to be pulled off a corner.
    pub clamped: bool,
}

/// A freshly chained chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainedChunk {
    /// The new chunk.
    pub chunk: Chunk,
    /// Its world offset.
    pub offset: WorldPos,
    /// Side of the predecessor the player left through.
    pub exit_side: Direction,
    /// World corner of the predecessor door tile.
    pub door_world: WorldPos,
    /// The entrance was clamped.
    pub clamped: bool,
}

/// Computes chained placements and builds the chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkChainer {
    tile_size: i64,
}

impl ChunkChainer {
    /// Creates a chainer for tiles of `tile_size` world units.
    #[inline]
    #[must_use]
    pub const fn new(tile_size: i64) -> Self {
        Self { tile_size }
    }

    /// Tile size in world units.
    #[inline]
    #[must_use]
    pub const fn tile_size(&self) -> i64 {
        self.tile_size
    }

    /// Pure offset/entrance math for a successor of `shape`.
    #[must_use]
    pub fn placement(&self, anchor: &ChainAnchor, shape: ChunkShape) -> ChainPlacement {
        let t = self.tile_size;
        let (width, height) = ChunkFactory::dimensions(shape);
        let door_world = anchor.door_world(t);
        let side = anchor.door.side;
        let entry = side.opposite();

        let clamp = |coord: usize, span: usize| coord.clamp(1, span - 2);
        let (entrance, offset) = match side {
            Direction::East | Direction::West => {
                let y = clamp(anchor.door.pos.y, height);
                let x = if side == Direction::East { 0 } else { width - 1 };
                let ox = if side == Direction::East {
                    anchor.offset.x + (anchor.width as i64 - 1) * t
                } else {
                    anchor.offset.x - (width as i64 - 1) * t
                };
                (TilePos::new(x, y), WorldPos::new(ox, door_world.y - y as i64 * t))
            }
            Direction::North | Direction::South => {
                let x = clamp(anchor.door.pos.x, width);
                let y = if side == Direction::South { 0 } else { height - 1 };
                let oy = if side == Direction::South {
                    anchor.offset.y + (anchor.height as i64 - 1) * t
                } else {
                    anchor.offset.y - (height as i64 - 1) * t
                };
                (TilePos::new(x, y), WorldPos::new(door_world.x - x as i64 * t, oy))
            }
        };

        let cross_door = if side.is_horizontal() {
            anchor.door.pos.y
        } else {
            anchor.door.pos.x
        };
        let cross_entrance = if side.is_horizontal() { entrance.y } else { entrance.x };

        ChainPlacement {
            entry,
            entrance,
            offset,
            clamped: cross_door != cross_entrance,
        }
    }

    /// Builds the successor chunk described by `plan`.
    #[must_use]
    pub fn chain(
        &self,
        factory: &ChunkFactory,
        anchor: &ChainAnchor,
        ticket: &ChunkTicket,
        plan: &ChunkPlan,
    ) -> ChainedChunk {
        let placement = self.placement(anchor, plan.shape);
        let chunk = factory.build(
            ticket,
            plan,
            placement.entry,
            EntrancePlan::Boundary(placement.entrance),
        );

        tracing::debug!(
            index = chunk.index,
            entry = %placement.entry.letter(),
            offset_x = placement.offset.x,
            offset_y = placement.offset.y,
            clamped = placement.clamped,
            "chunk chained"
        );

        ChainedChunk {
            chunk,
            offset: placement.offset,
            exit_side: anchor.door.side,
            door_world: anchor.door_world(self.tile_size),
            clamped: placement.clamped,
        }
    }
}
