//! # Run Events
//!
//! Tagged messages from the core to rendering, camera and game-state
//! collaborators.
//!
//! ## Delivery Order
//!
//! For a chunk transition the order is always:
//!
//! 1. `ChunkCreated`
//! 2. `HazardsSpawned`
//! 3. `ChunkTransition`
//!
//! Window events (`ChunkFading`, `ChunkDestroyed`, `GateClosed`,
//! `GameOver`) follow in the order the update step produced them.

use labyrinth_procedural::{Chunk, ChunkHazards, Direction, TilePos, WorldPos};

/// Event emitted by the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MazeEvent {
    /// A chunk was instantiated.
    ChunkCreated {
        /// Chunk index.
        index: u64,
        /// World offset of the chunk's corner.
        offset: WorldPos,
        /// Snapshot of the new chunk.
        chunk: Box<Chunk>,
    },

    /// Hazards of a new chunk are ready to be drawn.
    HazardsSpawned {
        /// Chunk index.
        index: u64,
        /// Hazard records.
        hazards: ChunkHazards,
    },

    /// The player left a chunk through its door.
    ChunkTransition {
        /// Chunk that was left.
        from: u64,
        /// Chunk that was entered.
        to: u64,
        /// Side of `from` holding the door.
        exit_side: Direction,
        /// World corner of the door tile.
        door_world: WorldPos,
        /// World centre of the new entrance tile.
        entrance_world: WorldPos,
    },

    /// A chunk started fading out.
    ChunkFading {
        /// Chunk index.
        index: u64,
    },

    /// A chunk was removed from the window.
    ChunkDestroyed {
        /// Chunk index.
        index: u64,
        /// World offset it had.
        offset: WorldPos,
        /// Width in tiles.
        width: usize,
        /// Height in tiles.
        height: usize,
    },

    /// An auto-gate shut behind the player.
    GateClosed {
        /// Chunk index.
        index: u64,
        /// Gate tile.
        tile: TilePos,
    },

    /// The player was inside a chunk when it was destroyed.
    GameOver {
        /// Chunk that took the player with it.
        index: u64,
    },
}

impl MazeEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChunkCreated { .. } => "chunk_created",
            Self::HazardsSpawned { .. } => "hazards_spawned",
            Self::ChunkTransition { .. } => "chunk_transition",
            Self::ChunkFading { .. } => "chunk_fading",
            Self::ChunkDestroyed { .. } => "chunk_destroyed",
            Self::GateClosed { .. } => "gate_closed",
            Self::GameOver { .. } => "game_over",
        }
    }
}

/// Event channel for core -> collaborator delivery.
pub struct EventChannel<T> {
    sender: crossbeam_channel::Sender<T>,
    receiver: crossbeam_channel::Receiver<T>,
}

impl<T> EventChannel<T> {
    /// Creates a new bounded event channel.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a new unbounded event channel.
    #[must_use]
    pub fn unbounded() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Tries to send an event (returns immediately).
    ///
    /// # Errors
    ///
    /// Returns the event back if the channel is full or disconnected.
    pub fn try_send(&self, event: T) -> Result<(), crossbeam_channel::TrySendError<T>> {
        self.sender.try_send(event)
    }

    /// Tries to receive an event (non-blocking).
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is empty.
    pub fn try_recv(&self) -> Result<T, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receives every pending event in delivery order.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Gets a clone of the receiver for another consumer.
    #[must_use]
    pub fn receiver(&self) -> crossbeam_channel::Receiver<T> {
        self.receiver.clone()
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_delivery() {
        let channel = EventChannel::unbounded();
        channel.try_send(MazeEvent::ChunkFading { index: 1 }).unwrap();
        channel.try_send(MazeEvent::GameOver { index: 1 }).unwrap();
        assert_eq!(channel.len(), 2);
        let names: Vec<&str> = channel.drain().iter().map(MazeEvent::name).collect();
        assert_eq!(names, vec!["chunk_fading", "game_over"]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_bounded_channel_rejects_overflow() {
        let channel = EventChannel::new(1);
        assert!(channel.try_send(MazeEvent::ChunkFading { index: 0 }).is_ok());
        assert!(channel.try_send(MazeEvent::ChunkFading { index: 1 }).is_err());
        assert_eq!(channel.try_recv(), Ok(MazeEvent::ChunkFading { index: 0 }));
    }

    #[test]
    fn test_shared_receiver_sees_events() {
        let channel = EventChannel::default();
        let receiver = channel.receiver();
        channel.try_send(MazeEvent::GateClosed { index: 2, tile: TilePos::new(3, 1) }).unwrap();
        assert_eq!(receiver.try_recv().map(|e| e.name()), Ok("gate_closed"));
    }
}
