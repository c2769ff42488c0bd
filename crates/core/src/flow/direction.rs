//! Neighbor direction table
//!
//! Directions are numbered clockwise starting from west:
//! ```text
//!   2  3  4
//!   1  0  5
//!   8  7  6
//! ```
//! Index 0 is the center cell and never a valid direction. Every
//! algorithm scans neighbors in ascending index order; ties in slope are
//! resolved in favor of the lower index, so this order is part of the
//! output format.

/// Neighbor offsets: (row_offset, col_offset), indexed by direction (1-8)
pub const OFFSETS: [(isize, isize); 9] = [
    (0, 0),   // 0: center
    (0, -1),  // 1: W
    (-1, -1), // 2: NW
    (-1, 0),  // 3: N
    (-1, 1),  // 4: NE
    (0, 1),   // 5: E
    (1, 1),   // 6: SE
    (1, 0),   // 7: S
    (1, -1),  // 8: SW
];

/// Whether each direction (1-8) points to a diagonal neighbor
pub const DIAGONAL: [bool; 9] = [false, false, true, false, true, false, true, false, true];

const NAMES: [&str; 9] = ["-", "W", "NW", "N", "NE", "E", "SE", "S", "SW"];

/// A compass direction to one of the eight neighbors of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Direction(u8);

impl Direction {
    pub const WEST: Direction = Direction(1);
    pub const NORTHWEST: Direction = Direction(2);
    pub const NORTH: Direction = Direction(3);
    pub const NORTHEAST: Direction = Direction(4);
    pub const EAST: Direction = Direction(5);
    pub const SOUTHEAST: Direction = Direction(6);
    pub const SOUTH: Direction = Direction(7);
    pub const SOUTHWEST: Direction = Direction(8);

    /// All directions in scan order
    pub const ALL: [Direction; 8] = [
        Direction::WEST,
        Direction::NORTHWEST,
        Direction::NORTH,
        Direction::NORTHEAST,
        Direction::EAST,
        Direction::SOUTHEAST,
        Direction::SOUTH,
        Direction::SOUTHWEST,
    ];

    /// The four orthogonal directions in scan order
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::WEST,
        Direction::NORTH,
        Direction::EAST,
        Direction::SOUTH,
    ];

    /// Build a direction from its index, `None` unless `1 <= n <= 8`
    pub fn new(n: u8) -> Option<Self> {
        (1..=8).contains(&n).then_some(Direction(n))
    }

    /// Direction index (1-8), also the weight slot in [`FlowProps`](super::FlowProps)
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Direction code as stored in a direction raster
    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    /// (row_offset, col_offset) of the neighbor
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        OFFSETS[self.index()]
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        DIAGONAL[self.index()]
    }

    /// Get the opposite direction
    pub fn opposite(self) -> Direction {
        Direction((self.0 - 1 + 4) % 8 + 1)
    }

    /// Short compass name ("W", "NW", ...)
    pub fn name(self) -> &'static str {
        NAMES[self.index()]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
