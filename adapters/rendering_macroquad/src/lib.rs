#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tile Glide.
//!
//! The adapter owns the window, the per-frame clock and keyboard polling. Each
//! frame it hands the timestamp and pressed steering keys to the caller's
//! update closure, then draws the checkerboard and every actor copy scaled to
//! fit the window. The area outside the world is painted over with the clear
//! color so seam copies only show on the opposite edge.
//!
//! Steering keys pressed in the same frame are reported in binding order, not
//! press order, so the later binding is the one the motion system sees last.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tile_glide_core::Timestamp;
use tile_glide_rendering::{
    ActorPresentation, CheckerboardPresentation, FrameInput, Presentation, RenderingBackend, Scene,
};

/// Physical keys polled every frame and the layout-independent code each reports.
const STEERING_KEYS: [(KeyCode, &str); 8] = [
    (KeyCode::Up, "ArrowUp"),
    (KeyCode::W, "KeyW"),
    (KeyCode::Down, "ArrowDown"),
    (KeyCode::S, "KeyS"),
    (KeyCode::Left, "ArrowLeft"),
    (KeyCode::A, "KeyA"),
    (KeyCode::Right, "ArrowRight"),
    (KeyCode::D, "KeyD"),
];

const FRAME_RATE_FONT_SIZE: f32 = 25.0;

fn pressed_steering_codes() -> Vec<&'static str> {
    STEERING_KEYS
        .iter()
        .filter(|(key, _)| is_key_pressed(*key))
        .map(|(_, code)| *code)
        .collect()
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `F` toggles the frame-rate overlay.
    toggle_frame_rate: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_frame_rate: is_key_pressed(KeyCode::F),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the frame-rate overlay starts visible and frame timing
    /// is logged once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_update: self.update_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Timestamp, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.background.width().round() as i32,
            window_height: scene.background.height().round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        tracing::info!(
            width = config.window_width,
            height = config.window_height,
            ?swap_interval,
            "opening macroquad window"
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut show_frame_rate = show_fps;

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    tracing::info!("quit requested");
                    break;
                }
                if keyboard.toggle_frame_rate {
                    show_frame_rate = !show_frame_rate;
                }

                macroquad::window::clear_background(background);

                let timestamp = Timestamp::from_millis(macroquad::time::get_time() * 1_000.0);
                let frame_input = FrameInput {
                    key_codes: pressed_steering_codes(),
                };

                let update_start = Instant::now();
                update_scene(timestamp, frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);

                let render_start = Instant::now();
                draw_checkerboard(&scene.background, &metrics);
                draw_actor(&scene.actor, &metrics);
                draw_letterbox(&metrics, screen_width, screen_height, background);
                if show_frame_rate {
                    draw_frame_rate(scene.frame_rate, &metrics);
                }
                let render_duration = render_start.elapsed();

                let dt_seconds = macroquad::time::get_frame_time();
                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: Duration::from_secs_f32(dt_seconds.max(0.0)),
                    update: update_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_update,
                        avg_render,
                    }) = fps_metrics
                    {
                        tracing::info!(
                            fps = per_second,
                            fps_10s = trailing_ten_seconds,
                            update_ms = avg_update.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps world units onto the window, preserving aspect ratio and centring the board.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    board_width_scaled: f32,
    board_height_scaled: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let world_width = scene.background.width();
        let world_height = scene.background.height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let board_width_scaled = world_width * scale;
        let board_height_scaled = world_height * scale;

        Self {
            scale,
            offset_x: ((screen_width - board_width_scaled) * 0.5).max(0.0),
            offset_y: ((screen_height - board_height_scaled) * 0.5).max(0.0),
            board_width_scaled,
            board_height_scaled,
        }
    }

    fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + world.x * self.scale,
            self.offset_y + world.y * self.scale,
        )
    }
}

fn draw_checkerboard(board: &CheckerboardPresentation, metrics: &SceneMetrics) {
    let tile_step = board.tile_length * metrics.scale;
    for column in 0..board.columns {
        for row in 0..board.rows {
            let corner = metrics.to_screen(Vec2::new(
                column as f32 * board.tile_length,
                row as f32 * board.tile_length,
            ));
            macroquad::shapes::draw_rectangle(
                corner.x,
                corner.y,
                tile_step,
                tile_step,
                to_macroquad_color(board.color_at(column, row)),
            );
        }
    }
}

fn draw_actor(actor: &ActorPresentation, metrics: &SceneMetrics) {
    let size = actor.size * metrics.scale;
    let color = to_macroquad_color(actor.color);
    for position in &actor.positions {
        let corner = metrics.to_screen(*position);
        macroquad::shapes::draw_rectangle(corner.x, corner.y, size, size, color);
    }
}

/// Masks everything outside the board so seam copies do not bleed into the margins.
fn draw_letterbox(
    metrics: &SceneMetrics,
    screen_width: f32,
    screen_height: f32,
    color: macroquad::color::Color,
) {
    for (x, y, width, height) in letterbox_rectangles(metrics, screen_width, screen_height) {
        macroquad::shapes::draw_rectangle(x, y, width, height, color);
    }
}

fn letterbox_rectangles(
    metrics: &SceneMetrics,
    screen_width: f32,
    screen_height: f32,
) -> Vec<(f32, f32, f32, f32)> {
    let left = metrics.offset_x;
    let top = metrics.offset_y;
    let right = left + metrics.board_width_scaled;
    let bottom = top + metrics.board_height_scaled;

    [
        (0.0, 0.0, left, screen_height),
        (right, 0.0, screen_width - right, screen_height),
        (left, 0.0, metrics.board_width_scaled, top),
        (left, bottom, metrics.board_width_scaled, screen_height - bottom),
    ]
    .into_iter()
    .filter(|(_, _, width, height)| *width > 0.0 && *height > 0.0)
    .collect()
}

fn draw_frame_rate(frame_rate: Option<u32>, metrics: &SceneMetrics) {
    let Some(frame_rate) = frame_rate else {
        return;
    };

    let anchor = metrics.to_screen(Vec2::new(10.0, 30.0));
    let _ = macroquad::text::draw_text(
        &format!("FPS: {frame_rate}"),
        anchor.x,
        anchor.y,
        FRAME_RATE_FONT_SIZE * metrics.scale,
        macroquad::color::BLACK,
    );
}

fn to_macroquad_color(color: tile_glide_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_glide_core::{Direction, GridConfig, Position};
    use tile_glide_rendering::ACTOR_COLOR;
    use tile_glide_system_input::direction_for_code;

    fn steering_code(key: KeyCode) -> Option<&'static str> {
        STEERING_KEYS
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, code)| *code)
    }

    fn scene() -> Scene {
        let config = GridConfig::default();
        Scene::new(
            CheckerboardPresentation::covering(&config),
            ActorPresentation::from_positions(&[Position::ORIGIN], 80.0, ACTOR_COLOR),
        )
    }

    #[test]
    fn scene_metrics_fit_the_board_inside_the_window() {
        let metrics = SceneMetrics::from_scene(&scene(), 640.0, 640.0);

        assert!((metrics.scale - 0.5).abs() <= f32::EPSILON);
        assert!((metrics.offset_x - 0.0).abs() <= f32::EPSILON);
        assert!((metrics.offset_y - 140.0).abs() <= 1e-4);
        assert!((metrics.board_height_scaled - 360.0).abs() <= 1e-4);
    }

    #[test]
    fn scene_metrics_map_world_corners_onto_the_board() {
        let metrics = SceneMetrics::from_scene(&scene(), 1280.0, 720.0);

        assert_eq!(metrics.to_screen(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(
            metrics.to_screen(Vec2::new(1280.0, 720.0)),
            Vec2::new(1280.0, 720.0)
        );
    }

    #[test]
    fn letterbox_covers_only_the_margins() {
        let exact = SceneMetrics::from_scene(&scene(), 1280.0, 720.0);
        assert!(letterbox_rectangles(&exact, 1280.0, 720.0).is_empty());

        let tall = SceneMetrics::from_scene(&scene(), 640.0, 640.0);
        let rectangles = letterbox_rectangles(&tall, 640.0, 640.0);
        assert_eq!(rectangles.len(), 2);
        for (_, y, _, height) in rectangles {
            assert!(y + height <= 140.0 + 1e-3 || y >= 500.0 - 1e-3);
        }
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = |millis| FrameBreakdown {
            frame: Duration::from_millis(millis),
            ..FrameBreakdown::default()
        };
        assert!(counter.record_frame(frame(250)).is_none());
        assert!(counter.record_frame(frame(250)).is_none());
        assert!(counter.record_frame(frame(250)).is_none());

        let metrics = counter
            .record_frame(frame(250))
            .expect("should report FPS after one second of samples");
        assert!((metrics.per_second - 4.0).abs() <= 1e-3);
        assert!((metrics.trailing_ten_seconds - 4.0).abs() <= 1e-3);
        assert!(counter.record_frame(frame(250)).is_none());
    }

    #[test]
    fn fps_counter_averages_update_and_render_time() {
        let mut counter = FpsCounter::default();
        let mut metrics = None;
        for _ in 0..10 {
            metrics = counter.record_frame(FrameBreakdown {
                frame: Duration::from_millis(100),
                update: Duration::from_millis(2),
                render: Duration::from_millis(6),
            });
        }

        let metrics = metrics.expect("ten 100ms frames fill one second");
        assert_eq!(metrics.avg_update, Duration::from_millis(2));
        assert_eq!(metrics.avg_render, Duration::from_millis(6));
    }

    #[test]
    fn every_polled_key_reports_a_bound_code() {
        let expected = [
            (KeyCode::Up, Direction::Up),
            (KeyCode::W, Direction::Up),
            (KeyCode::Down, Direction::Down),
            (KeyCode::S, Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::A, Direction::Left),
            (KeyCode::Right, Direction::Right),
            (KeyCode::D, Direction::Right),
        ];

        for (key, direction) in expected {
            let code = steering_code(key).expect("steering key must report a code");
            assert_eq!(direction_for_code(code), Some(direction), "{key:?} -> {code}");
        }
    }

    #[test]
    fn shortcut_keys_do_not_steer() {
        for key in [KeyCode::Escape, KeyCode::Q, KeyCode::F, KeyCode::Space] {
            assert_eq!(steering_code(key), None);
        }
    }

    #[test]
    fn steering_keys_are_polled_in_binding_order() {
        let codes: Vec<&str> = STEERING_KEYS.iter().map(|(_, code)| *code).collect();

        assert_eq!(
            codes,
            [
                "ArrowUp",
                "KeyW",
                "ArrowDown",
                "KeyS",
                "ArrowLeft",
                "KeyA",
                "ArrowRight",
                "KeyD"
            ]
        );
    }
}
