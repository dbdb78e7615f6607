use crate::game::Direction;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;

/// A user request, decoded from a terminal input event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Command {
    Quit,
    Turn(Direction),
    TogglePause,
    /// The terminal lost focus; this always pauses, never resumes
    FocusLost,
    /// The left mouse button was pressed at the given screen position
    Click(Position),
}

impl Command {
    pub(crate) fn from_event(event: &Event) -> Option<Command> {
        match *event {
            Event::FocusLost => Some(Command::FocusLost),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => Some(Command::Click(Position::new(column, row))),
            _ => Command::from_key_event(event.as_key_press_event()?),
        }
    }

    fn from_key_event(ev: KeyEvent) -> Option<Command> {
        match (ev.modifiers, ev.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Command::Quit),
            (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Command::Quit),
            (KeyModifiers::NONE, KeyCode::Char('w' | 'k') | KeyCode::Up) => {
                Some(Command::Turn(Direction::Up))
            }
            (KeyModifiers::NONE, KeyCode::Char('s' | 'j') | KeyCode::Down) => {
                Some(Command::Turn(Direction::Down))
            }
            (KeyModifiers::NONE, KeyCode::Char('a' | 'h') | KeyCode::Left) => {
                Some(Command::Turn(Direction::Left))
            }
            (KeyModifiers::NONE, KeyCode::Char('d' | 'l') | KeyCode::Right) => {
                Some(Command::Turn(Direction::Right))
            }
            (KeyModifiers::NONE, KeyCode::Char('p') | KeyCode::Esc) => Some(Command::TogglePause),
            _ => None,
        }
    }
}
