use super::direction::Direction;
use super::grid::Grid;
use ratatui::layout::Position;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// A single level: static walls plus where and how the snake starts
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Level {
    walls: HashSet<Position>,
    start: Option<Position>,
    direction: Option<Direction>,
    points_to_advance: Option<usize>,
}

impl Level {
    pub(crate) fn walls(&self) -> &HashSet<Position> {
        &self.walls
    }

    /// Return where the snake's head should be placed at the start of the
    /// level, defaulting to the center of `grid`
    pub(crate) fn start(&self, grid: Grid) -> Position {
        self.start.unwrap_or_else(|| grid.center())
    }

    /// Return the direction the snake faces at the start of the level,
    /// defaulting to right
    pub(crate) fn direction(&self) -> Direction {
        self.direction.unwrap_or(Direction::Right)
    }

    /// Return the snake length at which the level is complete, if any
    pub(crate) fn points_to_advance(&self) -> Option<usize> {
        self.points_to_advance
    }

    /// Check that every cell the level refers to lies within `grid` and that
    /// the snake does not start inside a wall
    fn validate(&self, grid: Grid, index: usize) -> Result<(), LevelsError> {
        if let Some(&pos) = self
            .walls
            .iter()
            .chain(self.start.as_ref())
            .find(|&&p| !grid.contains(p))
        {
            return Err(LevelsError::OutOfBounds {
                level: index + 1,
                x: pos.x,
                y: pos.y,
            });
        }
        if self.walls.contains(&self.start(grid)) {
            return Err(LevelsError::StartOnWall { level: index + 1 });
        }
        Ok(())
    }
}

/// The ordered, non-empty list of levels that a game progresses through
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LevelSet(Vec<Level>);

impl LevelSet {
    pub(crate) fn new(levels: Vec<Level>, grid: Grid) -> Result<LevelSet, LevelsError> {
        if levels.is_empty() {
            return Err(LevelsError::Empty);
        }
        for (i, lvl) in levels.iter().enumerate() {
            lvl.validate(grid, i)?;
        }
        Ok(LevelSet(levels))
    }

    /// Read a list of levels from a JSON file
    pub(crate) fn load(path: &Path, grid: Grid) -> Result<LevelSet, LevelsError> {
        let src = fs_err::read_to_string(path).map_err(LevelsError::Read)?;
        LevelSet::from_json(&src, grid)
    }

    pub(crate) fn from_json(src: &str, grid: Grid) -> Result<LevelSet, LevelsError> {
        let raw = serde_json::from_str::<Vec<RawLevel>>(src)?;
        LevelSet::new(raw.into_iter().map(Level::from).collect(), grid)
    }

    /// The levels that ship with the game: an open field, a walled arena, and
    /// two arenas with inner barriers.  The last level never ends.
    pub(crate) fn builtin(grid: Grid) -> LevelSet {
        let border = grid
            .positions()
            .filter(|p| p.x == 0 || p.y == 0 || p.x + 1 == grid.width || p.y + 1 == grid.height)
            .collect::<HashSet<_>>();
        let quarter_x = grid.width / 4;
        let quarter_y = grid.height / 4;
        let bars = grid
            .positions()
            .filter(|p| {
                (p.y == quarter_y || p.y == grid.height - quarter_y)
                    && (quarter_x..=grid.width - quarter_x).contains(&p.x)
            })
            .collect::<HashSet<_>>();
        let pillars = grid
            .positions()
            .filter(|p| {
                (p.x == quarter_x || p.x == grid.width - quarter_x)
                    && (quarter_y + 2..grid.height - quarter_y - 1).contains(&p.y)
            })
            .collect::<HashSet<_>>();
        LevelSet(vec![
            Level {
                points_to_advance: Some(28),
                ..Level::default()
            },
            Level {
                walls: border.clone(),
                points_to_advance: Some(38),
                ..Level::default()
            },
            Level {
                walls: &border | &bars,
                points_to_advance: Some(48),
                ..Level::default()
            },
            Level {
                walls: &(&border | &bars) | &pillars,
                start: Some(Position::new(grid.width / 2, quarter_y / 2)),
                direction: Some(Direction::Left),
                points_to_advance: None,
            },
        ])
    }

    /// Return the level at `index`.  Indices past the end cycle back through
    /// the list.
    pub(crate) fn get(&self, index: usize) -> &Level {
        &self.0[index % self.0.len()]
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
struct RawPoint {
    x: u16,
    y: u16,
}

impl From<RawPoint> for Position {
    fn from(value: RawPoint) -> Position {
        Position::new(value.x, value.y)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawLevel {
    #[serde(default)]
    walls: Vec<RawPoint>,
    #[serde(default)]
    start: Option<RawPoint>,
    #[serde(default)]
    dir: Option<Direction>,
    #[serde(default)]
    points: Option<usize>,
}

impl From<RawLevel> for Level {
    fn from(value: RawLevel) -> Level {
        Level {
            walls: value.walls.into_iter().map(Position::from).collect(),
            start: value.start.map(Position::from),
            direction: value.dir,
            points_to_advance: value.points,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum LevelsError {
    #[error("failed to read levels file")]
    Read(#[source] std::io::Error),
    #[error("failed to parse levels file")]
    Parse(#[from] serde_json::Error),
    #[error("levels file does not define any levels")]
    Empty,
    #[error("level {level} refers to cell ({x}, {y}), which is outside the grid")]
    OutOfBounds { level: usize, x: u16, y: u16 },
    #[error("level {level} starts the snake inside a wall")]
    StartOnWall { level: usize },
}
