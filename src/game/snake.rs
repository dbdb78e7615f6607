use super::direction::Direction;
use crate::consts;
use ratatui::layout::Position;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Snake state
///
/// All positions are relative to the top-left corner of the grid the snake is
/// on.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Snake {
    /// Movement steps per second
    pub(crate) speed: Speed,

    /// The length that the snake's path grows to and is then held at
    pub(crate) length: usize,

    /// The direction in which the snake is currently moving
    pub(crate) direction: Direction,

    /// The cells occupied by the snake, tail first; the last element is the
    /// head.  Never longer than `length`.
    pub(crate) path: VecDeque<Position>,

    pub(crate) lives: u32,

    /// Time accumulated towards the next movement step
    pub(crate) since_last_update: Duration,

    /// Set when the direction is changed and cleared on the next successful
    /// move, so that only one turn is taken per step
    pub(crate) turn_locked: bool,
}

impl Snake {
    /// Create a new snake at `start` facing in `direction` with the given
    /// number of lives.  The path holds just the head, and `length` is set
    /// to [`INITIAL_SNAKE_LENGTH`][consts::INITIAL_SNAKE_LENGTH].
    pub(crate) fn new(start: Position, direction: Direction, speed: Speed, lives: u32) -> Snake {
        Snake {
            speed,
            length: consts::INITIAL_SNAKE_LENGTH,
            direction,
            path: VecDeque::from([start]),
            lives,
            since_last_update: Duration::ZERO,
            turn_locked: false,
        }
    }

    /// Return the position of the snake's head
    pub(crate) fn head(&self) -> Position {
        // The path always holds at least the head
        self.path.back().copied().unwrap_or_default()
    }

    pub(crate) fn path(&self) -> &VecDeque<Position> {
        &self.path
    }

    /// Add `elapsed` to the time since the last movement step.  If a full
    /// step interval has now passed, consume it (keeping any remainder) and
    /// return `true`.
    pub(crate) fn step_due(&mut self, elapsed: Duration) -> bool {
        self.since_last_update = self.since_last_update.saturating_add(elapsed);
        let interval = self.speed.interval();
        if self.since_last_update < interval {
            false
        } else {
            self.since_last_update -= interval;
            true
        }
    }

    /// Change the snake's direction to `direction`.  Returns `false` if the
    /// request was ignored, either because a turn has already been made since
    /// the last step or because `direction` would reverse the snake into
    /// itself.
    pub(crate) fn turn(&mut self, direction: Direction) -> bool {
        if self.turn_locked || direction == self.direction.reverse() {
            return false;
        }
        self.direction = direction;
        self.turn_locked = true;
        true
    }

    /// Move the snake's head to `pos`, dropping the oldest cell of the path
    /// if it has reached its target length, and allow the next turn
    pub(crate) fn advance_to(&mut self, pos: Position) {
        self.path.push_back(pos);
        while self.path.len() > self.length {
            let _ = self.path.pop_front();
        }
        self.turn_locked = false;
    }

    /// Extend the snake's target length in response to eating food
    pub(crate) fn grow(&mut self, amount: usize) {
        self.length = self.length.saturating_add(amount);
    }

    /// Remove one life and return the number remaining
    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

/// Snake speed in movement steps per second.  Always positive and finite,
/// with a step interval that fits in a `Duration`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64")]
pub(crate) struct Speed(f64);

impl Speed {
    pub(crate) fn new(steps_per_second: f64) -> Option<Speed> {
        (steps_per_second.is_finite()
            && steps_per_second > 0.0
            && Duration::try_from_secs_f64(steps_per_second.recip()).is_ok())
        .then_some(Speed(steps_per_second))
    }

    pub(crate) fn get(self) -> f64 {
        self.0
    }

    /// Time between movement steps
    pub(crate) fn interval(self) -> Duration {
        Duration::try_from_secs_f64(self.0.recip()).unwrap_or(Duration::MAX)
    }
}

impl Default for Speed {
    fn default() -> Speed {
        Speed(consts::DEFAULT_SPEED)
    }
}

impl TryFrom<f64> for Speed {
    type Error = InvalidSpeed;

    fn try_from(value: f64) -> Result<Speed, InvalidSpeed> {
        Speed::new(value).ok_or(InvalidSpeed(value))
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("speed must be a positive number of steps per second, got {0}")]
pub(crate) struct InvalidSpeed(pub(crate) f64);
