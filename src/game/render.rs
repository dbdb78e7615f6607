use super::grid::Grid;
use super::paused::Paused;
use super::Game;
use crate::consts;
use crate::util::center_rect;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Margin, Position, Rect, Size},
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// Return the area, border included, in which the board for `grid` is drawn
/// when a game is rendered to `area`
pub(crate) fn board_area(area: Rect, grid: Grid) -> Rect {
    split_display(area, grid).0
}

/// Center the board and the status line beneath it within `area`
fn split_display(area: Rect, grid: Grid) -> (Rect, Rect) {
    let board_size = Size {
        width: grid.width.saturating_mul(consts::CELL_WIDTH).saturating_add(2),
        height: grid.height.saturating_add(2),
    };
    let display = center_rect(
        area,
        Size {
            width: board_size.width,
            height: board_size.height.saturating_add(1),
        },
    );
    let [board, status] =
        Layout::vertical([Constraint::Length(board_size.height), Constraint::Length(1)])
            .areas(display);
    (board, status)
}

impl<R> Widget for &Game<R> {
    /*
     * ·⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯·
     * ⋮▒▒              ⋮
     * ⋮  ████▌         ⋮
     * ⋮              ()⋮
     * ·⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯·
     *  ♥♥♥     Level: 1
     */

    fn render(self, area: Rect, buf: &mut Buffer) {
        let (board, status) = split_display(area, self.grid());
        // The board wraps around at every edge
        DottedBorder.render(board, buf);

        let mut canvas = Canvas {
            area: board.inner(Margin::new(1, 1)),
            buf,
        };
        for &pos in self.level().walls() {
            canvas.draw_cell(pos, consts::WALL_SYMBOL, consts::WALL_STYLE);
        }
        for item in self.food() {
            canvas.draw_cell(item.position, consts::FOOD_SYMBOL, consts::FOOD_STYLE);
        }
        if let Some(snake) = self.snake() {
            for &pos in snake.path() {
                canvas.draw_cell(pos, consts::SNAKE_BODY_SYMBOL, consts::SNAKE_STYLE);
            }
            canvas.draw_cell(
                snake.head(),
                snake.direction.head_symbol(),
                consts::SNAKE_STYLE,
            );
        }

        let lives = usize::try_from(self.lives()).unwrap_or(0);
        let hearts = std::iter::repeat_n(consts::LIFE_SYMBOL, lives).collect::<String>();
        Line::from_iter([Span::raw(" "), Span::styled(hearts, consts::LIVES_STYLE)])
            .render(status, buf);
        Line::from(format!("Level: {} ", self.level_index() + 1))
            .right_aligned()
            .render(status, buf);

        if self.paused() {
            Paused.render(center_rect(board, Paused::SIZE), buf);
        }
    }
}

/// A view of a buffer in grid coordinates, where each grid cell spans
/// [`CELL_WIDTH`][consts::CELL_WIDTH] terminal columns
#[derive(Debug, Eq, PartialEq)]
struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl Canvas<'_> {
    fn draw_char(&mut self, x: u16, y: u16, symbol: char, style: Option<Style>) {
        if !self.area.contains(Position::new(x, y)) {
            return;
        }
        if let Some(cell) = self.buf.cell_mut((x, y)) {
            cell.set_char(symbol);
            if let Some(style) = style {
                cell.set_style(Style::reset().patch(style));
            }
        }
    }

    fn draw_cell(&mut self, pos: Position, symbol: &str, style: Style) {
        let Some(x) = pos
            .x
            .checked_mul(consts::CELL_WIDTH)
            .and_then(|x| self.area.x.checked_add(x))
        else {
            return;
        };
        let Some(y) = self.area.y.checked_add(pos.y) else {
            return;
        };
        for (dx, ch) in (0..).zip(symbol.chars()) {
            if let Some(x) = x.checked_add(dx) {
                self.draw_char(x, y, ch, Some(style));
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct DottedBorder;

impl Widget for DottedBorder {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let (left, top) = (area.x, area.y);
        let right = area.right().saturating_sub(1);
        let bottom = area.bottom().saturating_sub(1);
        let mut canvas = Canvas { area, buf };
        for (x, y) in [(left, top), (right, top), (right, bottom), (left, bottom)] {
            canvas.draw_char(x, y, '·', None);
        }
        for x in (left + 1)..right {
            canvas.draw_char(x, top, '⋯', None);
            canvas.draw_char(x, bottom, '⋯', None);
        }
        for y in (top + 1)..bottom {
            canvas.draw_char(left, y, '⋮', None);
            canvas.draw_char(right, y, '⋮', None);
        }
    }
}
