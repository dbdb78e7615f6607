use crate::command::Command;
use crate::consts;
use crate::game::board_area;
use crate::runner::{Clock, GameLoop, SystemClock};
use crossterm::event::{self, Event};
use rand::Rng;
use ratatui::{
    backend::Backend,
    layout::{Margin, Rect},
    Terminal,
};
use std::io;
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) struct App<R = rand::rngs::ThreadRng, C = SystemClock> {
    game_loop: GameLoop<R, C>,

    /// Screen area of the playing field as of the last draw, used to
    /// interpret mouse clicks
    playfield: Rect,

    quitting: bool,
}

impl<R: Rng, C: Clock> App<R, C> {
    pub(crate) fn new(game_loop: GameLoop<R, C>) -> App<R, C> {
        App {
            game_loop,
            playfield: Rect::ZERO,
            quitting: false,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        self.game_loop.start();
        while !self.quitting {
            self.draw(&mut terminal)?;
            self.process_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let game = self.game_loop.game();
        let mut area = Rect::ZERO;
        terminal.draw(|frame| {
            area = frame.area();
            frame.render_widget(game, area);
        })?;
        self.playfield = board_area(area, game.grid()).inner(Margin::new(1, 1));
        Ok(())
    }

    /// Wait for either an input event or the next frame, whichever comes
    /// first.  While paused there are no frames, so this blocks until input
    /// arrives.
    fn process_input(&mut self) -> io::Result<()> {
        match self.game_loop.time_to_next_frame(consts::FRAME_PERIOD) {
            Some(wait) => {
                if event::poll(wait)? {
                    self.handle_event(&event::read()?);
                }
                if self
                    .game_loop
                    .time_to_next_frame(consts::FRAME_PERIOD)
                    .is_some_and(|d| d == Duration::ZERO)
                {
                    self.game_loop.tick();
                }
            }
            None => self.handle_event(&event::read()?),
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match Command::from_event(event) {
            Some(Command::Quit) => self.quitting = true,
            Some(Command::Turn(direction)) => {
                self.game_loop.turn(direction);
            }
            Some(Command::TogglePause) => self.game_loop.toggle_pause(),
            Some(Command::FocusLost) => {
                self.game_loop.pause();
            }
            Some(Command::Click(pos)) => {
                if self.playfield.contains(pos) {
                    self.game_loop.steer_toward(pos, self.playfield);
                }
            }
            None => (),
        }
    }
}
