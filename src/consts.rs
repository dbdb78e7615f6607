//! Assorted constants & hard-coded configuration
use ratatui::{
    layout::Size,
    style::{Color, Modifier, Style},
};
use std::time::Duration;

/// Target time between frames of the tick source (roughly 60 Hz)
pub(crate) const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Size of the playing field in grid cells
pub(crate) const GRID_SIZE: Size = Size {
    width: 32,
    height: 32,
};

/// Number of terminal columns used to draw a single grid cell
pub(crate) const CELL_WIDTH: u16 = 2;

/// Default snake speed in movement steps per second
pub(crate) const DEFAULT_SPEED: f64 = 8.0;

/// Number of lives a snake starts a new session with
pub(crate) const STARTING_LIVES: u32 = 3;

/// Target snake length at the start of each level
pub(crate) const INITIAL_SNAKE_LENGTH: usize = 8;

/// Number of movement ticks a food item stays on the board
pub(crate) const FOOD_TIME_TO_LIVE: i32 = 60;

/// How many cells the snake's target length increases by upon eating food
pub(crate) const FOOD_VALUE: usize = 5;

/// The maximum number of food items that can be present at one time
pub(crate) const MAX_FOOD: usize = 3;

/// Chance of spawning food on a tick with no food present, as a
/// `(numerator, denominator)` pair.  With `n` items present the denominator
/// is multiplied by `n + 1`.
pub(crate) const FOOD_SPAWN_RATIO: (u32, u32) = (8, 100);

/// How many random cells to try before giving up on placing food for a tick
pub(crate) const FOOD_PLACEMENT_ATTEMPTS: usize = 1000;

// Glyphs for the snake's head, by direction of travel
pub(crate) const SNAKE_HEAD_UP_SYMBOL: &str = "▀▀";
pub(crate) const SNAKE_HEAD_DOWN_SYMBOL: &str = "▄▄";
pub(crate) const SNAKE_HEAD_LEFT_SYMBOL: &str = "▐█";
pub(crate) const SNAKE_HEAD_RIGHT_SYMBOL: &str = "█▌";

/// Glyph for the parts of the snake's body
pub(crate) const SNAKE_BODY_SYMBOL: &str = "██";

/// Glyph for food
pub(crate) const FOOD_SYMBOL: &str = "()";

/// Glyph for walls
pub(crate) const WALL_SYMBOL: &str = "▒▒";

/// Glyph for a single remaining life in the status line
pub(crate) const LIFE_SYMBOL: char = '♥';

/// Style for the snake's head and body
pub(crate) const SNAKE_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);

/// Style for food
pub(crate) const FOOD_STYLE: Style = Style::new().fg(Color::LightGreen);

/// Style for walls
pub(crate) const WALL_STYLE: Style = Style::new().fg(Color::Gray);

/// Style for the lives indicator
pub(crate) const LIVES_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::DIM);

/// Style for the "PAUSED" overlay
pub(crate) const PAUSED_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
