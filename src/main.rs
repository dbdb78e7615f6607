mod app;
mod command;
mod config;
mod consts;
mod game;
mod runner;
mod util;
use crate::app::App;
use crate::config::Config;
use crate::game::{Game, Grid, LevelSet, Speed};
use crate::runner::{GameLoop, SystemClock};
use anyhow::Context;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use lexopt::{Arg, Parser, ValueExt};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "\
Usage: gridsnake [<options>]

Play a level-based snake game in the terminal

Options:
  -c, --config <PATH>     Read configuration from the given file
  -l, --levels <PATH>     Load levels from the given JSON file
  -s, --speed <N>         Move the snake N cells per second
      --log-file <PATH>   Write log messages to the given file
  -h, --help              Display this help message and exit
  -V, --version           Show the program version and exit
";

#[derive(Clone, Debug, PartialEq)]
enum Cli {
    Run(Arguments),
    Help,
    Version,
}

impl Cli {
    fn from_parser(mut parser: Parser) -> Result<Cli, lexopt::Error> {
        let mut args = Arguments::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('c') | Arg::Long("config") => {
                    args.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('l') | Arg::Long("levels") => {
                    args.levels_file = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('s') | Arg::Long("speed") => {
                    args.speed = Some(parser.value()?.parse_with(parse_speed)?);
                }
                Arg::Long("log-file") => {
                    args.log_file = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('h') | Arg::Long("help") => return Ok(Cli::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Cli::Version),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Cli::Run(args))
    }
}

/// Settings given on the command line, which take precedence over the
/// configuration file
#[derive(Clone, Debug, Default, PartialEq)]
struct Arguments {
    config: Option<PathBuf>,
    levels_file: Option<PathBuf>,
    speed: Option<Speed>,
    log_file: Option<PathBuf>,
}

impl Arguments {
    fn run(self) -> anyhow::Result<()> {
        let config = match self.config {
            Some(ref path) => Config::load(path, false).with_context(|| {
                format!("failed to load configuration from {}", path.display())
            })?,
            None => Config::default_path()
                .and_then(|path| Config::load(&path, true))
                .context("failed to load configuration")?,
        };
        let speed = self.speed.unwrap_or(config.game.speed);
        if let Some(path) = self.log_file.or(config.files.log_file) {
            init_logging(&path)?;
        }

        let grid = Grid::from(consts::GRID_SIZE);
        let levels = match self.levels_file.or(config.files.levels_file) {
            Some(path) => LevelSet::load(&path, grid)
                .with_context(|| format!("failed to load levels from {}", path.display()))?,
            None => LevelSet::builtin(grid),
        };
        log::info!(
            "Starting game with {} levels at {} steps per second",
            levels.len(),
            speed.get()
        );

        let app = App::new(GameLoop::new(Game::new(grid, levels, speed), SystemClock));
        let terminal = ratatui::init();
        let r = crossterm::execute!(io::stdout(), EnableFocusChange, EnableMouseCapture)
            .and_then(|()| app.run(terminal));
        let _ = crossterm::execute!(io::stdout(), DisableMouseCapture, DisableFocusChange);
        ratatui::restore();
        r.context("terminal I/O failed")
    }
}

fn parse_speed(s: &str) -> Result<Speed, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Speed::try_from(s.parse::<f64>()?)?)
}

/// Send log messages at `info` level and above (or as set by `RUST_LOG`) to
/// the file at `path`.  The terminal belongs to the game, so nothing is
/// logged unless a log file is given.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = fs_err::File::create(path).context("failed to open log file")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialize logging")
}

fn main() -> ExitCode {
    match Cli::from_parser(Parser::from_env()) {
        Ok(Cli::Run(args)) => exit_status(args.run()),
        Ok(Cli::Help) => {
            print!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Cli::Version) => {
            println!("gridsnake {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("gridsnake: {e}");
            eprintln!("Run `gridsnake --help` for usage");
            ExitCode::from(2)
        }
    }
}

fn exit_status(r: anyhow::Result<()>) -> ExitCode {
    match r {
        Ok(()) => ExitCode::SUCCESS,
        Err(e)
            if e.downcast_ref::<io::Error>()
                .is_some_and(|ioe| ioe.kind() == ErrorKind::BrokenPipe) =>
        {
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("gridsnake: {e:?}");
            ExitCode::from(2)
        }
    }
}
