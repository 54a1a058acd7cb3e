#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tile Glide adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use tile_glide_core::{GridConfig, Position, Timestamp};

/// Longest frame delta, in seconds, considered when estimating the frame rate.
pub const MAX_FRAME_DELTA_SECONDS: f64 = 0.1;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Light checkerboard tile, `#cccccc`.
pub const LIGHT_TILE_COLOR: Color = Color::from_rgb_u8(0xcc, 0xcc, 0xcc);

/// Dark checkerboard tile, `#999999`.
pub const DARK_TILE_COLOR: Color = Color::from_rgb_u8(0x99, 0x99, 0x99);

/// Fill used for the controlled entity, `#0099b0`.
pub const ACTOR_COLOR: Color = Color::from_rgb_u8(0x00, 0x99, 0xb0);

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Layout-independent codes of the keys pressed since the previous frame,
    /// in the order the backend polls its key bindings.
    pub key_codes: Vec<&'static str>,
}

/// Static checkerboard drawn beneath the entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckerboardPresentation {
    /// Number of tile columns to draw.
    pub columns: u32,
    /// Number of tile rows to draw.
    pub rows: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
    /// Color of tiles whose column and row sum to an even number.
    pub even_color: Color,
    /// Color of the remaining tiles.
    pub odd_color: Color,
}

impl CheckerboardPresentation {
    /// Builds the default light/dark checkerboard covering the configured world.
    ///
    /// Partial tiles at the far edges are rounded up so the world is fully covered.
    #[must_use]
    pub fn covering(config: &GridConfig) -> Self {
        let tile = config.tile_length();
        Self {
            columns: config.world_width().div_ceil(tile),
            rows: config.world_height().div_ceil(tile),
            tile_length: tile as f32,
            even_color: LIGHT_TILE_COLOR,
            odd_color: DARK_TILE_COLOR,
        }
    }

    /// Color of the tile at the provided column and row.
    #[must_use]
    pub const fn color_at(&self, column: u32, row: u32) -> Color {
        if (column + row) % 2 == 0 {
            self.even_color
        } else {
            self.odd_color
        }
    }

    /// Calculates the total width of the board.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the board.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }
}

/// Square entity drawn once per drawable position.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Top-left corners of every copy to draw, in world units.
    pub positions: Vec<Vec2>,
    /// Side length of the square.
    pub size: f32,
    /// Fill color.
    pub color: Color,
}

impl ActorPresentation {
    /// Creates an actor descriptor from motion positions.
    #[must_use]
    pub fn from_positions<'a, I>(positions: I, size: f32, color: Color) -> Self
    where
        I: IntoIterator<Item = &'a Position>,
    {
        Self {
            positions: positions.into_iter().map(to_vec2).collect(),
            size,
            color,
        }
    }

    /// Replaces the drawn copies with the provided motion positions.
    pub fn set_positions<'a, I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = &'a Position>,
    {
        self.positions.clear();
        self.positions.extend(positions.into_iter().map(to_vec2));
    }
}

fn to_vec2(position: &Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

/// Scene description combining the checkerboard, the entity and the overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Checkerboard that composes the world backdrop.
    pub background: CheckerboardPresentation,
    /// The controlled entity.
    pub actor: ActorPresentation,
    /// Most recent frame-rate estimate, if one is available.
    pub frame_rate: Option<u32>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(background: CheckerboardPresentation, actor: ActorPresentation) -> Self {
        Self {
            background,
            actor,
            frame_rate: None,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame and mask the area outside the world.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Estimates frames per second from consecutive frame timestamps.
///
/// Each frame delta is capped at [`MAX_FRAME_DELTA_SECONDS`] so a stalled tab
/// or debugger pause does not report a near-zero rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameRateMeter {
    previous: Option<Timestamp>,
}

impl FrameRateMeter {
    /// Records a frame and returns the instantaneous rate.
    ///
    /// The first frame only establishes the baseline, and a frame that reports
    /// no elapsed time produces no reading.
    pub fn record(&mut self, timestamp: Timestamp) -> Option<u32> {
        let previous = self.previous.replace(timestamp)?;
        let delta = (timestamp.millis_since(previous) / 1_000.0).min(MAX_FRAME_DELTA_SECONDS);
        if delta <= 0.0 {
            return None;
        }
        Some((1.0 / delta).round() as u32)
    }
}

/// Rendering backend capable of presenting Tile Glide scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame timestamp in
    /// milliseconds, the input captured since the previous frame, and may
    /// mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Timestamp, FrameInput, &mut Scene) + 'static;
}
