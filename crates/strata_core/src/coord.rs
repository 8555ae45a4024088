//! # Grid Coordinates
//!
//! The world is a stack of 2D grids. Level 0 is the surface; higher levels
//! are deeper. Within a level, `x` grows to the right and `y` grows down,
//! matching screen space.

/// Address of a single cell in the level-indexed grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Depth index (0 = surface).
    pub level: u32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Creates a new coordinate.
    #[inline]
    #[must_use]
    pub const fn new(level: u32, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }

    /// Returns the coordinate shifted by `(dx, dy)` on the same level,
    /// saturating at the `i32` bounds.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            level: self.level,
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Returns the adjacent coordinate in `direction`.
    #[inline]
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Returns the four orthogonal neighbours (up, down, left, right).
    #[must_use]
    pub const fn neighbors4(self) -> [Self; 4] {
        [
            self.step(Direction::Up),
            self.step(Direction::Down),
            self.step(Direction::Left),
            self.step(Direction::Right),
        ]
    }
}

/// One of the four orthogonal facings.
///
/// Also the key of animation frame tables, where it is written by its
/// lowercase name (`up`, `down`, `left`, `right`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Towards negative `y`.
    Up,
    /// Towards positive `y`.
    #[default]
    Down,
    /// Towards negative `x`.
    Left,
    /// Towards positive `x`.
    Right,
}

impl Direction {
    /// All directions, in a fixed order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit grid delta `(dx, dy)` of one step in this direction.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// The facing pointing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parses a lowercase name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// Direction of a single-axis unit delta, if it is one.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_neighbors() {
        let c = Coord::new(2, 5, 5);
        assert_eq!(c.step(Direction::Up), Coord::new(2, 5, 4));
        assert_eq!(c.step(Direction::Right), Coord::new(2, 6, 5));

        let n = c.neighbors4();
        assert!(n.iter().all(|o| o.level == 2));
        assert!(n.contains(&Coord::new(2, 4, 5)));
        assert!(n.contains(&Coord::new(2, 5, 6)));

        let corner = Coord::new(0, i32::MAX, i32::MIN);
        assert_eq!(corner.step(Direction::Right), corner);
        assert_eq!(corner.step(Direction::Up), corner);
    }

    #[test]
    fn test_direction_delta_roundtrip() {
        for d in Direction::ALL {
            let (dx, dy) = d.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(d));
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::from_delta(1, 1), None);
        assert_eq!(Direction::from_name("left"), Some(Direction::Left));
        assert_eq!(Direction::from_name("Left"), None);
    }
}
