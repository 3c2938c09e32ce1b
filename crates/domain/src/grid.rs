//! Grid geometry primitives
//!
//! Maps are dense rectangular grids addressed by column/row coordinates.
//! Origin is the top-left cell, `x` grows eastward, `y` grows southward.
//! Movement is strictly orthogonal: every cell has at most four neighbors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Hard cap on either grid dimension. Keeps authoring tools and save files
/// within sane bounds.
pub const MAX_GRID_DIM: u32 = 256;

// ============================================================================
// Direction
// ============================================================================

/// One of the four cardinal directions of orthogonal movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in stable presentation order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Coordinate delta for one step in this direction
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// The direction of travel back the way you came
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "north" => Ok(Direction::North),
            "south" => Ok(Direction::South),
            "east" => Ok(Direction::East),
            "west" => Ok(Direction::West),
            other => Err(DomainError::parse(format!(
                "unknown direction '{other}', expected north/south/east/west"
            ))),
        }
    }
}

// ============================================================================
// Position
// ============================================================================

/// A cell address on the grid. Plain data, freely copyable.
///
/// Positions are not bounds-checked on construction; [`GridSize::contains`]
/// is the single place where in-map membership is decided.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell one step away in `direction`
    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.offset();
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbor cells, paired with the direction that
    /// reaches them, in [`Direction::ALL`] order
    pub fn neighbors(&self) -> [(Direction, Position); 4] {
        [
            (Direction::North, self.step(Direction::North)),
            (Direction::South, self.step(Direction::South)),
            (Direction::East, self.step(Direction::East)),
            (Direction::West, self.step(Direction::West)),
        ]
    }

    /// True when `other` is exactly one orthogonal step away
    pub fn is_adjacent_to(&self, other: Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }

    /// Direction that reaches `other` in one step, if adjacent
    pub fn direction_to(&self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.step(*d) == other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// GridSize
// ============================================================================

/// Validated dimensions of a map grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Create a grid size. Both dimensions must be in `1..=MAX_GRID_DIM`.
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::validation(format!(
                "grid dimensions must be at least 1x1, got {width}x{height}"
            )));
        }
        if width > MAX_GRID_DIM || height > MAX_GRID_DIM {
            return Err(DomainError::validation(format!(
                "grid dimensions must not exceed {MAX_GRID_DIM}, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total cell count
    pub fn cell_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True when `position` lies inside the grid
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    /// Iterate all cell positions in row-major order (left to right, top to
    /// bottom)
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
