#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tile Glide experience.

mod config;
mod session;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tile_glide_core::WINDOW_TITLE;
use tile_glide_rendering::{Color, Presentation, RenderingBackend};
use tile_glide_rendering_macroquad::MacroquadBackend;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{CliArgs, Settings},
    session::Session,
};

/// Fill used outside the world when the window aspect ratio differs.
const LETTERBOX_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Entry point for the Tile Glide command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level)?;

    let settings = Settings::resolve(&args)?;
    tracing::info!(
        tile_length = settings.grid.tile_length(),
        columns = settings.grid.columns(),
        rows = settings.grid.rows(),
        direction = ?settings.direction,
        "grid configured"
    );

    let session = Session::new(&settings);

    if let Some(frames) = args.headless {
        if !(args.frame_ms > 0.0) {
            anyhow::bail!("--frame-ms must be positive (received {})", args.frame_ms);
        }
        let position = session::run_headless(session, frames, args.frame_ms);
        println!("{} {}", position.x(), position.y());
        return Ok(());
    }

    run_windowed(session, &settings)
}

fn run_windowed(mut session: Session, settings: &Settings) -> Result<()> {
    let presentation = Presentation::new(WINDOW_TITLE, LETTERBOX_COLOR, session.initial_scene());

    MacroquadBackend::new()
        .with_vsync(settings.vsync)
        .with_show_fps(settings.show_fps)
        .run(presentation, move |timestamp, input, scene| {
            session.update(timestamp, input, scene);
        })
        .context("rendering backend failed")
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter {default_filter:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!(error))
}
