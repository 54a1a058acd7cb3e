#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Glide workspace.
//!
//! This crate defines the message surface that connects adapters and the
//! motion system. Adapters submit [`Command`] values describing directional
//! intent and frame timing, the movement system applies them to the state it
//! owns, and then reports [`Event`] values describing what changed. The grid
//! geometry every participant agrees on lives in [`GridConfig`], which can only
//! be constructed in a valid state.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Title shown by adapters that open a window.
pub const WINDOW_TITLE: &str = "Tile Glide";

/// Default edge length of a square tile, in world units.
pub const DEFAULT_TILE_LENGTH: u32 = 80;

/// Default world width, in world units.
pub const DEFAULT_WORLD_WIDTH: u32 = 1280;

/// Default world height, in world units.
pub const DEFAULT_WORLD_HEIGHT: u32 = 720;

/// Default minimum time between two step initiations.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(200);

/// Default time a single step takes to slide from one tile to the next.
pub const DEFAULT_STEP_DURATION: Duration = Duration::from_millis(200);

/// Commands that express all permissible motion mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Requests that subsequent steps travel in the provided direction.
    RequestDirection {
        /// Direction the next step should use.
        direction: Direction,
    },
    /// Advances the motion clock to the provided frame timestamp.
    Advance {
        /// Timestamp supplied by the host's per-frame callback.
        timestamp: Timestamp,
    },
}

/// Events reported by the movement system after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the desired direction was updated.
    DirectionChanged {
        /// Direction that the next step will use.
        direction: Direction,
    },
    /// Reports that a direction request would have reversed the in-flight step.
    DirectionRejected {
        /// Direction requested by the input source.
        requested: Direction,
        /// Direction of the step currently in flight.
        in_flight: Direction,
    },
    /// Announces that a new tile step began.
    StepStarted {
        /// Direction of travel for the step.
        direction: Direction,
        /// Position the step departs from.
        origin: Position,
        /// Unwrapped position the step slides toward.
        target: Position,
        /// Timestamp at which the step began.
        at: Timestamp,
    },
    /// Confirms that the in-flight step finished and snapped onto its target.
    StepCompleted {
        /// Resting position after wraparound.
        position: Position,
        /// Whether the target crossed a world boundary and had to be wrapped.
        wrapped: bool,
    },
}

/// Cardinal movement directions available to the controlled entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Direction; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Unit displacement expressed in whole tiles, with y growing downward.
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }

    /// Direction pointing the exact opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Continuous position measured in world units.
///
/// Positions address the top-left corner of the tile drawn for the entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// The world origin.
    pub const ORIGIN: Position = Position::new(0.0, 0.0);

    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Linearly interpolates toward `other`, component-wise.
    ///
    /// `t` is clamped to `0.0..=1.0`, and the endpoints are returned exactly.
    #[must_use]
    pub fn lerp(self, other: Position, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Frame timestamp measured in milliseconds since an arbitrary epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Creates a timestamp from a millisecond reading.
    #[must_use]
    pub const fn from_millis(millis: f64) -> Self {
        Self(millis)
    }

    /// Millisecond reading wrapped by the timestamp.
    #[must_use]
    pub const fn millis(&self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`.
    ///
    /// Negative when the clock went backwards; callers do not guard against it.
    #[must_use]
    pub fn millis_since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }
}

/// Validated grid geometry and step timing shared by every participant.
///
/// World dimensions are exact multiples of the tile length so that wraparound
/// lands on tile boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    tile_length: u32,
    world_width: u32,
    world_height: u32,
    step_interval: Duration,
    step_duration: Duration,
}

impl GridConfig {
    /// Creates a grid description using the default step timing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the tile length is zero, the world has no
    /// area, or either world dimension is not a multiple of the tile length.
    pub fn new(tile_length: u32, world_width: u32, world_height: u32) -> Result<Self, ConfigError> {
        if tile_length == 0 {
            return Err(ConfigError::ZeroTileLength);
        }
        if world_width == 0 || world_height == 0 {
            return Err(ConfigError::EmptyWorld {
                width: world_width,
                height: world_height,
            });
        }
        if world_width % tile_length != 0 {
            return Err(ConfigError::MisalignedWidth {
                width: world_width,
                tile_length,
            });
        }
        if world_height % tile_length != 0 {
            return Err(ConfigError::MisalignedHeight {
                height: world_height,
                tile_length,
            });
        }

        Ok(Self {
            tile_length,
            world_width,
            world_height,
            step_interval: DEFAULT_STEP_INTERVAL,
            step_duration: DEFAULT_STEP_DURATION,
        })
    }

    /// Overrides the step cadence and slide duration.
    #[must_use]
    pub const fn with_step_timing(mut self, interval: Duration, duration: Duration) -> Self {
        self.step_interval = interval;
        self.step_duration = duration;
        self
    }

    /// Edge length of a square tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> u32 {
        self.tile_length
    }

    /// World width in world units.
    #[must_use]
    pub const fn world_width(&self) -> u32 {
        self.world_width
    }

    /// World height in world units.
    #[must_use]
    pub const fn world_height(&self) -> u32 {
        self.world_height
    }

    /// Number of tile columns spanning the world.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.world_width / self.tile_length
    }

    /// Number of tile rows spanning the world.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.world_height / self.tile_length
    }

    /// Minimum time between two step initiations.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Time a step takes to slide from origin to target.
    #[must_use]
    pub const fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// Position of the top-left corner of the provided tile.
    #[must_use]
    pub fn tile_origin(&self, column: u32, row: u32) -> Position {
        Position::new(
            (column * self.tile_length) as f32,
            (row * self.tile_length) as f32,
        )
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_length: DEFAULT_TILE_LENGTH,
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            step_interval: DEFAULT_STEP_INTERVAL,
            step_duration: DEFAULT_STEP_DURATION,
        }
    }
}

/// Reasons a grid configuration is rejected at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Tiles must have a positive edge length.
    #[error("tile length must be positive")]
    ZeroTileLength,
    /// The world must cover a positive area.
    #[error("world must have a positive area (received {width}x{height})")]
    EmptyWorld {
        /// Requested world width.
        width: u32,
        /// Requested world height.
        height: u32,
    },
    /// World width does not align with tile boundaries.
    #[error("world width {width} is not a multiple of tile length {tile_length}")]
    MisalignedWidth {
        /// Requested world width.
        width: u32,
        /// Requested tile length.
        tile_length: u32,
    },
    /// World height does not align with tile boundaries.
    #[error("world height {height} is not a multiple of tile length {tile_length}")]
    MisalignedHeight {
        /// Requested world height.
        height: u32,
        /// Requested tile length.
        tile_length: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Direction, GridConfig, Position, Timestamp};

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert_ne!(direction, direction.opposite());
            assert_eq!(direction.opposite().opposite(), direction);

            let (dx, dy) = direction.unit_vector();
            let (ox, oy) = direction.opposite().unit_vector();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn unit_vectors_grow_downward() {
        assert_eq!(Direction::Up.unit_vector(), (0, -1));
        assert_eq!(Direction::Down.unit_vector(), (0, 1));
        assert_eq!(Direction::Left.unit_vector(), (-1, 0));
        assert_eq!(Direction::Right.unit_vector(), (1, 0));
    }

    #[test]
    fn lerp_clamps_and_hits_endpoints_exactly() {
        let origin = Position::new(0.0, 40.0);
        let target = Position::new(80.0, 40.0);

        assert_eq!(origin.lerp(target, -0.5), origin);
        assert_eq!(origin.lerp(target, 0.25), Position::new(20.0, 40.0));
        assert_eq!(origin.lerp(target, 1.0), target);
        assert_eq!(origin.lerp(target, 3.0), target);
    }

    #[test]
    fn timestamps_report_signed_elapsed_time() {
        let earlier = Timestamp::from_millis(200.0);
        let later = Timestamp::from_millis(450.5);

        assert!((later.millis_since(earlier) - 250.5).abs() < f64::EPSILON);
        assert!(earlier.millis_since(later) < 0.0);
    }

    #[test]
    fn default_grid_matches_reference_dimensions() {
        let config = GridConfig::default();

        assert_eq!(config.tile_length(), 80);
        assert_eq!(config.columns(), 16);
        assert_eq!(config.rows(), 9);
        assert_eq!(config.step_interval().as_millis(), 200);
        assert_eq!(config.step_duration().as_millis(), 200);
        assert_eq!(GridConfig::new(80, 1280, 720), Ok(config));
    }

    #[test]
    fn grid_rejects_misaligned_dimensions() {
        assert_eq!(
            GridConfig::new(80, 1300, 720),
            Err(ConfigError::MisalignedWidth {
                width: 1300,
                tile_length: 80,
            })
        );
        assert_eq!(
            GridConfig::new(80, 1280, 700),
            Err(ConfigError::MisalignedHeight {
                height: 700,
                tile_length: 80,
            })
        );
    }

    #[test]
    fn grid_rejects_degenerate_dimensions() {
        assert_eq!(GridConfig::new(0, 1280, 720), Err(ConfigError::ZeroTileLength));
        assert_eq!(
            GridConfig::new(80, 0, 720),
            Err(ConfigError::EmptyWorld {
                width: 0,
                height: 720,
            })
        );
    }

    #[test]
    fn tile_origin_scales_by_tile_length() {
        let config = GridConfig::default();

        assert_eq!(config.tile_origin(3, 2), Position::new(240.0, 160.0));
    }

    #[test]
    fn config_errors_describe_the_violation() {
        let error = GridConfig::new(64, 1000, 640).expect_err("1000 is not a multiple of 64");

        assert_eq!(
            error.to_string(),
            "world width 1000 is not a multiple of tile length 64"
        );
    }
}
