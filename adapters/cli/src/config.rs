use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tile_glide_core::{
    Direction, GridConfig, Position, DEFAULT_STEP_DURATION, DEFAULT_STEP_INTERVAL,
    DEFAULT_TILE_LENGTH, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};

/// Slides a square around a wrapping tile grid.
#[derive(Debug, Parser)]
#[command(name = "tile-glide", version)]
pub(crate) struct CliArgs {
    /// TOML file providing defaults for every other option.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Edge length of a tile in world units.
    #[arg(long)]
    pub(crate) tile_length: Option<u32>,
    /// World width in world units; must be a multiple of the tile length.
    #[arg(long)]
    pub(crate) world_width: Option<u32>,
    /// World height in world units; must be a multiple of the tile length.
    #[arg(long)]
    pub(crate) world_height: Option<u32>,
    /// Minimum time between two step initiations.
    #[arg(long, value_name = "MS")]
    pub(crate) step_interval_ms: Option<u64>,
    /// Time one step takes to slide between tiles.
    #[arg(long, value_name = "MS")]
    pub(crate) step_duration_ms: Option<u64>,
    /// Initial direction of travel.
    #[arg(long, value_enum)]
    pub(crate) direction: Option<DirectionArg>,
    /// Column of the starting tile.
    #[arg(long)]
    pub(crate) start_column: Option<u32>,
    /// Row of the starting tile.
    #[arg(long)]
    pub(crate) start_row: Option<u32>,
    /// Draw the frame-rate overlay and log frame-rate summaries.
    #[arg(long)]
    pub(crate) show_fps: bool,
    /// Present frames without waiting for vertical sync.
    #[arg(long)]
    pub(crate) no_vsync: bool,
    /// Default log filter, overridden by `RUST_LOG`.
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub(crate) log_level: String,
    /// Run the given number of frames without opening a window.
    #[arg(long, value_name = "FRAMES")]
    pub(crate) headless: Option<u32>,
    /// Simulated frame length used by headless runs.
    #[arg(long, default_value_t = 1000.0 / 60.0, value_name = "MS")]
    pub(crate) frame_ms: f64,
}

/// Direction names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DirectionArg {
    Left,
    Right,
    Up,
    Down,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Left => Direction::Left,
            DirectionArg::Right => Direction::Right,
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
        }
    }
}

/// Optional settings read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    grid: GridSection,
    timing: TimingSection,
    actor: ActorSection,
    display: DisplaySection,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GridSection {
    tile_length: Option<u32>,
    world_width: Option<u32>,
    world_height: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TimingSection {
    step_interval_ms: Option<u64>,
    step_duration_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ActorSection {
    start_column: Option<u32>,
    start_row: Option<u32>,
    direction: Option<Direction>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DisplaySection {
    show_fps: Option<bool>,
    vsync: Option<bool>,
}

impl ConfigFile {
    /// Parses the TOML representation of a configuration file.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("malformed configuration file")
    }

    fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse configuration from {}", path.display()))
    }
}

/// Fully resolved startup settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) grid: GridConfig,
    pub(crate) start: Position,
    pub(crate) direction: Direction,
    pub(crate) show_fps: bool,
    pub(crate) vsync: bool,
}

impl Settings {
    /// Loads the optional configuration file and layers the flags on top.
    pub(crate) fn resolve(args: &CliArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(args, &file)
    }

    /// Combines defaults, file values and flags, in increasing precedence.
    pub(crate) fn merge(args: &CliArgs, file: &ConfigFile) -> Result<Self> {
        let tile_length = args
            .tile_length
            .or(file.grid.tile_length)
            .unwrap_or(DEFAULT_TILE_LENGTH);
        let world_width = args
            .world_width
            .or(file.grid.world_width)
            .unwrap_or(DEFAULT_WORLD_WIDTH);
        let world_height = args
            .world_height
            .or(file.grid.world_height)
            .unwrap_or(DEFAULT_WORLD_HEIGHT);

        let interval = args
            .step_interval_ms
            .or(file.timing.step_interval_ms)
            .map_or(DEFAULT_STEP_INTERVAL, Duration::from_millis);
        let duration = args
            .step_duration_ms
            .or(file.timing.step_duration_ms)
            .map_or(DEFAULT_STEP_DURATION, Duration::from_millis);

        let grid = GridConfig::new(tile_length, world_width, world_height)
            .context("invalid grid configuration")?
            .with_step_timing(interval, duration);

        let column = args.start_column.or(file.actor.start_column).unwrap_or(0);
        let row = args.start_row.or(file.actor.start_row).unwrap_or(0);
        if column >= grid.columns() || row >= grid.rows() {
            anyhow::bail!(
                "start tile ({column}, {row}) lies outside the {}x{} grid",
                grid.columns(),
                grid.rows()
            );
        }

        let direction = args
            .direction
            .map(Direction::from)
            .or(file.actor.direction)
            .unwrap_or(Direction::Right);

        Ok(Self {
            grid,
            start: grid.tile_origin(column, row),
            direction,
            show_fps: args.show_fps || file.display.show_fps.unwrap_or(false),
            vsync: !args.no_vsync && file.display.vsync.unwrap_or(true),
        })
    }
}
