use ratatui::layout::{Position, Positions, Rect, Size};
use std::collections::{HashSet, VecDeque};

/// The playing field: a toroidal grid of `width` × `height` cells.  Moving
/// off one edge re-enters from the opposite edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Grid {
    pub(crate) width: u16,
    pub(crate) height: u16,
}

impl Grid {
    pub(crate) fn size(self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Return the cell at the center of the grid
    pub(crate) fn center(self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub(crate) fn contains(self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Iterate over every cell in the grid, row by row
    pub(crate) fn positions(self) -> Positions {
        Rect::from((Position::ORIGIN, self.size())).positions()
    }

    /// Return the cell reached by moving `(dx, dy)` from `pos`, wrapping
    /// around both axes
    pub(crate) fn offset(self, pos: Position, dx: i32, dy: i32) -> Position {
        Position {
            x: wrap(i32::from(pos.x) + dx, self.width),
            y: wrap(i32::from(pos.y) + dy, self.height),
        }
    }
}

impl From<Size> for Grid {
    fn from(size: Size) -> Grid {
        Grid {
            width: size.width,
            height: size.height,
        }
    }
}

/// Bring `coordinate` into the range `0..dimension`, wrapping around at both
/// ends.  A zero-sized dimension always yields 0.
pub(crate) fn wrap(coordinate: i32, dimension: u16) -> u16 {
    if dimension == 0 {
        return 0;
    }
    let wrapped = coordinate.rem_euclid(i32::from(dimension));
    // rem_euclid() with a positive modulus is always in 0..dimension
    u16::try_from(wrapped).unwrap_or_default()
}

/// A set of occupied grid cells that can be tested for membership
pub(crate) trait Occupied {
    fn occupies(&self, pos: Position) -> bool;
}

impl Occupied for HashSet<Position> {
    fn occupies(&self, pos: Position) -> bool {
        self.contains(&pos)
    }
}

impl Occupied for VecDeque<Position> {
    fn occupies(&self, pos: Position) -> bool {
        self.contains(&pos)
    }
}

/// Return `true` if `pos` is occupied by any of the given sets of cells
pub(crate) fn collides_with(pos: Position, obstacles: &[&dyn Occupied]) -> bool {
    obstacles.iter().any(|set| set.occupies(pos))
}
