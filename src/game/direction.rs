use super::grid::Grid;
use crate::consts;
use ratatui::layout::Position;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Return the cell one step from `pos` in this direction, wrapping around
    /// the edges of `grid`
    pub(crate) fn advance(self, pos: Position, grid: Grid) -> Position {
        let (dx, dy) = self.unit_vector();
        grid.offset(pos, dx, dy)
    }

    pub(crate) fn unit_vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub(crate) fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub(crate) fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Return the glyph pair used to draw a snake's head moving in this
    /// direction
    pub(crate) fn head_symbol(self) -> &'static str {
        match self {
            Direction::Up => consts::SNAKE_HEAD_UP_SYMBOL,
            Direction::Right => consts::SNAKE_HEAD_RIGHT_SYMBOL,
            Direction::Down => consts::SNAKE_HEAD_DOWN_SYMBOL,
            Direction::Left => consts::SNAKE_HEAD_LEFT_SYMBOL,
        }
    }
}
