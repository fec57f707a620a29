//! Directional input buffering.
//!
//! Turns raw key edges into one-tile step commands. Entries expire after a
//! short window so stale taps never move the player, and a press-order stack
//! of held directions lets two held keys turn a corner on their own.

use std::collections::VecDeque;

use labyrinth_procedural::Direction;
use serde::{Deserialize, Serialize};

/// Movement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// W key.
    W,
    /// A key.
    A,
    /// S key.
    S,
    /// D key.
    D,
}

impl Key {
    /// Direction this key steers.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::ArrowUp | Self::W => Direction::North,
            Self::ArrowDown | Self::S => Direction::South,
            Self::ArrowLeft | Self::A => Direction::West,
            Self::ArrowRight | Self::D => Direction::East,
        }
    }
}

/// Buffer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum queued entries; extra pushes are dropped.
    pub capacity: usize,
    /// Entries older than this are discarded.
    pub expiry_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            expiry_ms: 200,
        }
    }
}

/// One queued step intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedInput {
    /// Requested direction.
    pub dir: Direction,
    /// Time the intent was queued.
    pub at_ms: u64,
}

/// Time-windowed queue of step intents.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    config: InputConfig,
    queue: VecDeque<BufferedInput>,
    /// Held directions, first pressed first.
    hold_order: Vec<Direction>,
}

impl InputBuffer {
    /// Creates a buffer with the given tuning.
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            queue: VecDeque::with_capacity(config.capacity),
            hold_order: Vec::with_capacity(4),
        }
    }

    /// Held directions in press order.
    #[must_use]
    pub fn hold_order(&self) -> &[Direction] {
        &self.hold_order
    }

    /// Returns true if `dir` is currently held.
    #[must_use]
    pub fn is_held(&self, dir: Direction) -> bool {
        self.hold_order.contains(&dir)
    }

    /// Number of queued entries (expired ones included until the next cleanup).
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Records a key press.
    ///
    /// A new press is queued when it is the only held direction, or when it
    /// turns at right angles to the first held one.
    pub fn press(&mut self, dir: Direction, now_ms: u64) {
        if self.is_held(dir) {
            return;
        }
        self.hold_order.push(dir);
        let queue_it = match self.hold_order.as_slice() {
            [_] => true,
            [first, ..] => first.is_perpendicular(dir),
            [] => false,
        };
        if queue_it {
            self.push(dir, now_ms);
        }
    }

    /// Records a key release. The next held direction takes over.
    pub fn release(&mut self, dir: Direction, now_ms: u64) {
        self.hold_order.retain(|d| *d != dir);
        if let Some(&next) = self.hold_order.first() {
            self.push(next, now_ms);
        }
    }

    /// Convenience: press by key.
    pub fn key_down(&mut self, key: Key, now_ms: u64) {
        self.press(key.direction(), now_ms);
    }

    /// Convenience: release by key.
    pub fn key_up(&mut self, key: Key, now_ms: u64) {
        self.release(key.direction(), now_ms);
    }

    /// Queues an intent unless the buffer is full.
    pub fn push(&mut self, dir: Direction, now_ms: u64) {
        self.cleanup(now_ms);
        if self.queue.len() < self.config.capacity {
            self.queue.push_back(BufferedInput { dir, at_ms: now_ms });
        }
    }

    /// Pops the oldest intent that has not expired.
    pub fn consume(&mut self, now_ms: u64) -> Option<BufferedInput> {
        self.cleanup(now_ms);
        self.queue.pop_front()
    }

    /// Re-queues a held direction after a completed step.
    ///
    /// If another held direction turns at right angles to `dir`, that one is
    /// queued instead.
    pub fn repeat(&mut self, dir: Direction, now_ms: u64) {
        if !self.is_held(dir) {
            return;
        }
        let next = self
            .hold_order
            .iter()
            .copied()
            .find(|d| *d != dir && d.is_perpendicular(dir))
            .unwrap_or(dir);
        self.push(next, now_ms);
    }

    /// Moves a held direction to the front of the hold order.
    pub fn promote(&mut self, dir: Direction) {
        if let Some(i) = self.hold_order.iter().position(|d| *d == dir) {
            let held = self.hold_order.remove(i);
            self.hold_order.insert(0, held);
        }
    }

    /// Picks the step to take for `dir`.
    ///
    /// When `dir` is blocked, a held perpendicular direction that is open
    /// wins and is promoted. Returns `None` if nothing can move.
    pub fn resolve_step(&mut self, dir: Direction, blocked: impl Fn(Direction) -> bool) -> Option<Direction> {
        if !blocked(dir) {
            return Some(dir);
        }
        let alternative = self
            .hold_order
            .iter()
            .copied()
            .find(|d| d.is_perpendicular(dir) && !blocked(*d))?;
        self.promote(alternative);
        Some(alternative)
    }

    /// Clears queue and hold state.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.hold_order.clear();
    }

    fn cleanup(&mut self, now_ms: u64) {
        let expiry = self.config.expiry_ms;
        self.queue.retain(|entry| now_ms.saturating_sub(entry.at_ms) <= expiry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> InputBuffer {
        InputBuffer::new(InputConfig::default())
    }

    #[test]
    fn test_single_press_queues() {
        let mut input = buffer();
        input.press(Direction::East, 0);
        assert_eq!(input.consume(10).map(|e| e.dir), Some(Direction::East));
        assert_eq!(input.consume(10), None);
    }

    #[test]
    fn test_expired_entries_never_returned() {
        let mut input = buffer();
        input.press(Direction::North, 0);
        assert_eq!(input.consume(201), None);

        input.push(Direction::South, 1000);
        assert_eq!(input.consume(1200).map(|e| e.dir), Some(Direction::South));
    }

    #[test]
    fn test_capacity_drops_overflow() {
        let mut input = buffer();
        for dir in [Direction::North, Direction::East, Direction::South, Direction::West, Direction::North] {
            input.push(dir, 5);
        }
        assert_eq!(input.len(), 4);
        let drained: Vec<Direction> = std::iter::from_fn(|| input.consume(5)).map(|e| e.dir).collect();
        assert_eq!(drained, vec![Direction::North, Direction::East, Direction::South, Direction::West]);
    }

    #[test]
    fn test_parallel_second_press_not_queued() {
        let mut input = buffer();
        input.press(Direction::East, 0);
        input.press(Direction::West, 1);
        assert_eq!(input.len(), 1);
        input.press(Direction::North, 2);
        assert_eq!(input.len(), 2);
        assert_eq!(input.hold_order(), &[Direction::East, Direction::West, Direction::North]);
    }

    #[test]
    fn test_release_requeues_next_held() {
        let mut input = buffer();
        input.press(Direction::East, 0);
        input.press(Direction::North, 0);
        let _ = input.consume(0);
        let _ = input.consume(0);
        input.release(Direction::East, 50);
        assert_eq!(input.hold_order(), &[Direction::North]);
        assert_eq!(input.consume(50).map(|e| e.dir), Some(Direction::North));
    }

    #[test]
    fn test_repeat_prefers_perpendicular() {
        let mut input = buffer();
        input.press(Direction::East, 0);
        assert_eq!(input.consume(0).map(|e| e.dir), Some(Direction::East));
        input.repeat(Direction::East, 100);
        assert_eq!(input.consume(100).map(|e| e.dir), Some(Direction::East));

        input.press(Direction::South, 150);
        let _ = input.consume(150);
        input.repeat(Direction::East, 200);
        assert_eq!(input.consume(200).map(|e| e.dir), Some(Direction::South));

        input.repeat(Direction::West, 250);
        assert!(input.is_empty());
    }

    #[test]
    fn test_corner_auto_turn() {
        let mut input = buffer();
        input.press(Direction::East, 0);
        input.press(Direction::North, 0);
        let step = input.resolve_step(Direction::East, |d| d == Direction::East);
        assert_eq!(step, Some(Direction::North));
        assert_eq!(input.hold_order()[0], Direction::North);
        assert_eq!(input.resolve_step(Direction::East, |_| true), None);
    }

    #[test]
    fn test_key_mapping() {
        let mut input = buffer();
        input.key_down(Key::A, 0);
        assert!(input.is_held(Direction::West));
        input.key_up(Key::ArrowLeft, 10);
        assert!(input.hold_order().is_empty());
        assert_eq!(Key::W.direction(), Direction::North);
        assert_eq!(Key::ArrowDown.direction(), Direction::South);
        assert_eq!(Key::D.direction(), Direction::East);
    }
}
