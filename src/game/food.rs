use super::grid::{collides_with, Grid, Occupied};
use crate::consts;
use rand::Rng;
use ratatui::layout::Position;

/// A food item.  It disappears after [`FOOD_TIME_TO_LIVE`][consts::FOOD_TIME_TO_LIVE]
/// movement ticks unless eaten first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Food {
    pub(crate) position: Position,

    /// Remaining movement ticks before the food expires
    pub(crate) time_to_live: i32,

    /// How much the snake's length increases by when it eats this item
    pub(crate) value: usize,
}

impl Food {
    pub(crate) fn new(position: Position) -> Food {
        Food {
            position,
            time_to_live: consts::FOOD_TIME_TO_LIVE,
            value: consts::FOOD_VALUE,
        }
    }

    /// Place a new food item on a random cell of `grid` that is not occupied
    /// by any of `obstacles`.
    ///
    /// Cells are sampled uniformly at random.  If no free cell is hit after
    /// [`FOOD_PLACEMENT_ATTEMPTS`][consts::FOOD_PLACEMENT_ATTEMPTS] tries,
    /// `None` is returned and no food should be spawned this tick.
    pub(crate) fn place<R: Rng>(
        rng: &mut R,
        grid: Grid,
        obstacles: &[&dyn Occupied],
    ) -> Option<Food> {
        if grid.width == 0 || grid.height == 0 {
            return None;
        }
        (0..consts::FOOD_PLACEMENT_ATTEMPTS)
            .map(|_| {
                Position::new(
                    rng.random_range(0..grid.width),
                    rng.random_range(0..grid.height),
                )
            })
            .find(|&pos| !collides_with(pos, obstacles))
            .map(Food::new)
    }

    /// Count down one movement tick
    pub(crate) fn age(&mut self) {
        self.time_to_live -= 1;
    }

    pub(crate) fn expired(&self) -> bool {
        self.time_to_live <= 0
    }
}
