use crate::game::{Direction, Game, StepOutcome};
use rand::Rng;
use ratatui::layout::{Position, Rect};
use std::time::{Duration, Instant};

/// A source of timestamps for measuring the time between frames
pub(crate) trait Clock {
    fn now(&self) -> Instant;
}

#[cfg(test)]
impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Drives a [`Game`] from a stream of frame ticks, measuring the time between
/// them and handling pausing & resuming
#[derive(Clone, Debug)]
pub(crate) struct GameLoop<R = rand::rngs::ThreadRng, C = SystemClock> {
    game: Game<R>,
    clock: C,
    state: LoopState,
}

impl<R, C: Clock> GameLoop<R, C> {
    pub(crate) fn new(game: Game<R>, clock: C) -> Self {
        GameLoop {
            game,
            clock,
            state: LoopState::Idle,
        }
    }

    pub(crate) fn game(&self) -> &Game<R> {
        &self.game
    }

    pub(crate) fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Stop delivering ticks to the game.  Returns `false` if the loop was
    /// not running.
    pub(crate) fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = LoopState::Paused;
        self.game.set_paused(true);
        log::info!("Game paused");
        true
    }

    /// Resume a paused loop.  Time spent paused is not counted towards the
    /// next tick.  Returns `false` if the loop was not paused.
    pub(crate) fn resume(&mut self) -> bool {
        if self.state != LoopState::Paused {
            return false;
        }
        self.state = LoopState::Running {
            last_frame: self.clock.now(),
        };
        self.game.set_paused(false);
        log::info!("Game resumed");
        true
    }

    pub(crate) fn toggle_pause(&mut self) {
        if !self.pause() {
            self.resume();
        }
    }

    /// Return when the next tick is due, or `None` if no tick should be
    /// scheduled
    pub(crate) fn next_frame(&self, period: Duration) -> Option<Instant> {
        match self.state {
            LoopState::Running { last_frame } => last_frame.checked_add(period),
            LoopState::Idle | LoopState::Paused => None,
        }
    }

    /// Return how long until the next tick is due, or `None` if no tick
    /// should be scheduled.  A tick that is already overdue gives zero.
    pub(crate) fn time_to_next_frame(&self, period: Duration) -> Option<Duration> {
        self.next_frame(period)
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    pub(crate) fn turn(&mut self, direction: Direction) -> bool {
        self.game.turn(direction)
    }

    pub(crate) fn steer_toward(&mut self, click: Position, board: Rect) -> bool {
        self.game.steer_toward(click, board)
    }
}

impl<R: Rng, C: Clock> GameLoop<R, C> {
    /// Start a new session and begin delivering ticks
    pub(crate) fn start(&mut self) -> StepOutcome {
        self.game.set_paused(false);
        self.game.reset();
        self.state = LoopState::Running {
            last_frame: self.clock.now(),
        };
        self.game.update(Duration::ZERO)
    }

    /// Advance the game by the time elapsed since the previous tick.  Does
    /// nothing and returns `None` if the loop is not running.
    ///
    /// If the game ends, a new session is started immediately.
    pub(crate) fn tick(&mut self) -> Option<StepOutcome> {
        let LoopState::Running { last_frame } = self.state else {
            return None;
        };
        let now = self.clock.now();
        self.state = LoopState::Running { last_frame: now };
        let outcome = self.game.update(now.saturating_duration_since(last_frame));
        if outcome == StepOutcome::GameOver {
            log::info!("Starting a new game");
            self.game.reset();
        }
        Some(outcome)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LoopState {
    /// Not started yet
    Idle,
    Running {
        last_frame: Instant,
    },
    Paused,
}

/// A clock that only moves when told to
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ManualClock(std::cell::Cell<Instant>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> ManualClock {
        ManualClock(std::cell::Cell::new(Instant::now()))
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}
