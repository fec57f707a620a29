//! # Tiles and Directions
//!
//! The closed set of tile kinds a chunk can hold, plus the four compass
//! directions used for chunk sides, movement and pathfinding.
//!
//! Tile behaviour is expressed as exhaustive `match`es so that adding a
//! kind is a compile error everywhere it matters.

use bytemuck::NoUninit;

/// Kind of a single maze tile.
///
/// The `u8` discriminants are stable and shared with renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum TileKind {
    /// Solid wall.
    #[default]
    Wall = 0,
    /// Walkable floor.
    Floor = 1,
    /// Key chest.
    Chest = 2,
    /// Chunk exit.
    Door = 3,
    /// Secondary key chest.
    ItemChest = 4,
    /// Wall-mounted marker (oxygen console).
    Special = 5,
    /// Passable once any key is held.
    SilverDoor = 6,
    /// Oxygen pickup; reverts to floor once collected.
    Oxygen = 7,
    /// Opens once passed, then closes behind the passer.
    AutoGate = 8,
    /// Impassable reactor core segment.
    Reactor = 9,
}

impl TileKind {
    /// Returns the stable numeric code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Wall,
            1 => Self::Floor,
            2 => Self::Chest,
            3 => Self::Door,
            4 => Self::ItemChest,
            5 => Self::Special,
            6 => Self::SilverDoor,
            7 => Self::Oxygen,
            8 => Self::AutoGate,
            9 => Self::Reactor,
            _ => return None,
        })
    }

    /// Returns true if generation-time reachability may pass through this tile.
    ///
    /// Only walls block the chest/door validation walk.
    #[inline]
    #[must_use]
    pub const fn is_open_for_layout(self) -> bool {
        match self {
            Self::Wall => false,
            Self::Floor
            | Self::Chest
            | Self::Door
            | Self::ItemChest
            | Self::Special
            | Self::SilverDoor
            | Self::Oxygen
            | Self::AutoGate
            | Self::Reactor => true,
        }
    }

    /// Returns true for tiles that hand out a key.
    #[inline]
    #[must_use]
    pub const fn is_key_source(self) -> bool {
        match self {
            Self::Chest | Self::ItemChest => true,
            Self::Wall
            | Self::Floor
            | Self::Door
            | Self::Special
            | Self::SilverDoor
            | Self::Oxygen
            | Self::AutoGate
            | Self::Reactor => false,
        }
    }
}

/// One of the four compass directions. Y grows southwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Up, -Y.
    North,
    /// Right, +X.
    East,
    /// Down, +Y.
    South,
    /// Left, -X.
    West,
}

impl Direction {
    /// All directions in canonical N, E, S, W order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Returns the unit step `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Returns the opposite direction.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Returns true for East/West.
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// Returns true if the two directions are at right angles.
    #[inline]
    #[must_use]
    pub const fn is_perpendicular(self, other: Self) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }

    /// Returns the single-letter side name.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }
}

/// Local tile coordinate inside one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TilePos {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl TilePos {
    /// Creates a tile position.
    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (king moves).
    #[inline]
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> usize {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy {
            dx
        } else {
            dy
        }
    }

    /// Returns true if `other` is this tile or one of its 8 neighbours.
    #[inline]
    #[must_use]
    pub const fn is_near(self, other: Self) -> bool {
        self.chebyshev(other) <= 1
    }

    /// Steps one tile in `dir`, returning `None` when leaving the
    /// non-negative quadrant.
    #[inline]
    #[must_use]
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dx, dy) = dir.delta();
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Self { x, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in 0..=9u8 {
            let kind = TileKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(TileKind::from_code(10), None);
    }

    #[test]
    fn test_layout_openness() {
        assert!(!TileKind::Wall.is_open_for_layout());
        assert!(TileKind::Door.is_open_for_layout());
        assert!(TileKind::Chest.is_key_source());
        assert!(TileKind::ItemChest.is_key_source());
        assert!(!TileKind::Oxygen.is_key_source());
    }

    #[test]
    fn test_direction_relations() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert!(!dir.is_perpendicular(dir.opposite()));
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert!(Direction::North.is_perpendicular(Direction::East));
    }

    #[test]
    fn test_tile_step_and_distance() {
        let origin = TilePos::new(0, 0);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::East), Some(TilePos::new(1, 0)));
        assert!(TilePos::new(3, 3).is_near(TilePos::new(4, 4)));
        assert!(!TilePos::new(3, 3).is_near(TilePos::new(5, 3)));
        assert_eq!(TilePos::new(1, 7).chebyshev(TilePos::new(4, 2)), 5);
    }
}
