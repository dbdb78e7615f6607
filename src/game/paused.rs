use crate::consts;
use ratatui::{
    buffer::Buffer,
    layout::{Rect, Size},
    text::{Line, Span},
    widgets::{Block, Clear, Widget},
};

/// A widget for the pop-up shown over the board while the game is paused
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct Paused;

impl Paused {
    /// The size that should be used for the `Rect` passed to
    /// `Paused::render()`
    pub(super) const SIZE: Size = Size {
        width: 16,
        height: 3,
    };
}

impl Widget for Paused {
    /*
     * ┌──────────────┐
     * │    PAUSED    │
     * └──────────────┘
     */

    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::bordered();
        let inner = block.inner(area);
        block.render(area, buf);
        Line::from(Span::styled("PAUSED", consts::PAUSED_STYLE))
            .centered()
            .render(inner, buf);
    }
}
