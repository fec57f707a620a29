//! # Active Chunk Window
//!
//! The ordered set of live chunks around the player.
//!
//! ## Lifecycle
//!
//! Each `update` call, in order:
//!
//! 1. Age every chunk by the frame delta
//! 2. Tick electric machines
//! 3. Update auto-gates in the chunk holding the player
//! 4. Horizon rule: chunks `destroy_margin` or more behind the player go
//! 5. Age rule: non-initial chunks older than `fade_delay_ms` fade, then go
//!    after `fade_duration_ms`
//!
//! A chunk destroyed while the player stands inside it ends the run. That
//! is reported once; later destructions never report it again.

use labyrinth_procedural::{Chunk, TilePos, WorldPos};

use crate::config::WindowConfig;

/// A live chunk and its retention state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveChunk {
    /// The chunk.
    pub chunk: Chunk,
    /// World position of tile (0, 0).
    pub offset: WorldPos,
    /// Time since the chunk entered the window.
    pub age_ms: u64,
    /// Time since fading began, if it has.
    pub fade_elapsed_ms: Option<u64>,
}

impl ActiveChunk {
    /// Wraps a freshly created chunk.
    #[must_use]
    pub const fn new(chunk: Chunk, offset: WorldPos) -> Self {
        Self {
            chunk,
            offset,
            age_ms: 0,
            fade_elapsed_ms: None,
        }
    }

    /// Half-open world bounds `[min, max)`.
    #[must_use]
    pub const fn bounds(&self, tile_size: i64) -> (WorldPos, WorldPos) {
        let max = WorldPos::new(
            self.offset.x + self.chunk.width() as i64 * tile_size,
            self.offset.y + self.chunk.height() as i64 * tile_size,
        );
        (self.offset, max)
    }

    /// Returns true if `pos` lies inside the chunk.
    #[must_use]
    pub const fn contains(&self, pos: WorldPos, tile_size: i64) -> bool {
        let (min, max) = self.bounds(tile_size);
        pos.x >= min.x && pos.x < max.x && pos.y >= min.y && pos.y < max.y
    }

    /// Local tile under `pos`, if inside.
    #[must_use]
    pub fn local_tile(&self, pos: WorldPos, tile_size: i64) -> Option<TilePos> {
        if !self.contains(pos, tile_size) {
            return None;
        }
        let x = usize::try_from((pos.x - self.offset.x) / tile_size).ok()?;
        let y = usize::try_from((pos.y - self.offset.y) / tile_size).ok()?;
        Some(TilePos::new(x, y))
    }

    /// Returns true once fading has begun.
    #[inline]
    #[must_use]
    pub const fn is_fading(&self) -> bool {
        self.fade_elapsed_ms.is_some()
    }
}

/// A chunk removed by `update`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestroyedChunk {
    /// Chunk index.
    pub index: u64,
    /// World offset it had.
    pub offset: WorldPos,
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
}

/// What one `update` call changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowReport {
    /// Chunks that started fading.
    pub faded: Vec<u64>,
    /// Chunks removed, oldest first.
    pub destroyed: Vec<DestroyedChunk>,
    /// Auto-gates that shut, with their chunk index.
    pub gates_closed: Vec<(u64, TilePos)>,
    /// Set on the one update that ends the run.
    pub game_over: Option<u64>,
}

/// Live chunks ordered by index.
#[derive(Clone, Debug)]
pub struct ChunkWindow {
    chunks: Vec<ActiveChunk>,
    config: WindowConfig,
    tile_size: i64,
    game_over_fired: bool,
}

impl ChunkWindow {
    /// Creates an empty window.
    #[must_use]
    pub fn new(config: WindowConfig, tile_size: i64) -> Self {
        Self {
            chunks: Vec::new(),
            config,
            tile_size,
            game_over_fired: false,
        }
    }

    /// Tile size in world units.
    #[inline]
    #[must_use]
    pub const fn tile_size(&self) -> i64 {
        self.tile_size
    }

    /// Retention settings.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> WindowConfig {
        self.config
    }

    /// Appends a new chunk. Indices must arrive in increasing order.
    pub fn push(&mut self, chunk: Chunk, offset: WorldPos) {
        debug_assert!(!matches!(self.chunks.last(), Some(last) if last.chunk.index >= chunk.index));
        self.chunks.push(ActiveChunk::new(chunk, offset));
    }

    /// Live chunks, oldest first.
    #[inline]
    #[must_use]
    pub fn chunks(&self) -> &[ActiveChunk] {
        &self.chunks
    }

    /// Number of live chunks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunk is live.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Newest chunk.
    #[must_use]
    pub fn latest(&self) -> Option<&ActiveChunk> {
        self.chunks.last()
    }

    /// Live chunk with `index`.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&ActiveChunk> {
        self.chunks.iter().find(|a| a.chunk.index == index)
    }

    /// Mutable access to the live chunk with `index`.
    pub fn get_mut(&mut self, index: u64) -> Option<&mut ActiveChunk> {
        self.chunks.iter_mut().find(|a| a.chunk.index == index)
    }

    /// Returns true once a destruction has swallowed the player.
    #[inline]
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over_fired
    }

    /// Slot of the oldest chunk containing `pos`.
    pub(crate) fn slot_at(&self, pos: WorldPos) -> Option<usize> {
        self.chunks.iter().position(|a| a.contains(pos, self.tile_size))
    }

    /// Returns true if a newer chunk has sealed its entrance on `pos`.
    ///
    /// The entrance shares a world tile with the predecessor's door, so the
    /// oldest-first lookup alone never sees it while the predecessor lives.
    #[must_use]
    pub fn is_sealed_entrance(&self, pos: WorldPos) -> bool {
        self.chunks.iter().any(|a| {
            a.chunk.entrance_sealed && a.local_tile(pos, self.tile_size) == Some(a.chunk.entrance)
        })
    }

    /// Advances the window by `delta_ms` with the player at `player`.
    pub fn update(&mut self, delta_ms: u64, player: WorldPos) -> WindowReport {
        let mut report = WindowReport::default();
        let tile_size = self.tile_size;
        let player_slot = self.slot_at(player);
        let player_index = player_slot.map(|slot| self.chunks[slot].chunk.index);

        for active in &mut self.chunks {
            active.age_ms = active.age_ms.saturating_add(delta_ms);
            active.chunk.tick_hazards(delta_ms);
        }

        if let Some(slot) = player_slot {
            let active = &mut self.chunks[slot];
            let tile = active.local_tile(player, tile_size);
            let index = active.chunk.index;
            report
                .gates_closed
                .extend(active.chunk.update_gates(tile).into_iter().map(|pos| (index, pos)));
        }

        let WindowConfig {
            fade_delay_ms,
            fade_duration_ms,
            destroy_margin,
        } = self.config;
        let mut doomed = Vec::new();
        for (slot, active) in self.chunks.iter_mut().enumerate() {
            let index = active.chunk.index;
            if player_index.is_some_and(|p| p >= index.saturating_add(destroy_margin)) {
                doomed.push(slot);
                continue;
            }
            if index == 0 {
                continue;
            }
            match active.fade_elapsed_ms {
                Some(elapsed) => active.fade_elapsed_ms = Some(elapsed.saturating_add(delta_ms)),
                None if active.age_ms > fade_delay_ms => {
                    active.fade_elapsed_ms = Some(0);
                    report.faded.push(index);
                }
                None => {}
            }
            if active.fade_elapsed_ms.is_some_and(|elapsed| elapsed >= fade_duration_ms) {
                doomed.push(slot);
            }
        }

        for slot in doomed.into_iter().rev() {
            let gone = self.chunks.remove(slot);
            let index = gone.chunk.index;
            tracing::debug!(index, age_ms = gone.age_ms, "chunk destroyed");
            if gone.contains(player, tile_size) && !self.game_over_fired {
                self.game_over_fired = true;
                report.game_over = Some(index);
            }
            report.destroyed.push(DestroyedChunk {
                index,
                offset: gone.offset,
                width: gone.chunk.width(),
                height: gone.chunk.height(),
            });
        }
        report.destroyed.reverse();
        report
    }
}
