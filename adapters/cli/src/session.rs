use tile_glide_core::{Command, Event, Position, Timestamp};
use tile_glide_rendering::{
    ActorPresentation, CheckerboardPresentation, FrameInput, FrameRateMeter, Scene, ACTOR_COLOR,
};
use tile_glide_system_input::Steering;
use tile_glide_system_movement::MotionController;

use crate::config::Settings;

/// Per-frame glue between the input translator, the motion controller and the
/// scene handed to the renderer.
#[derive(Debug)]
pub(crate) struct Session {
    controller: MotionController,
    steering: Steering,
    frame_rate: FrameRateMeter,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Session {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            controller: MotionController::new(settings.grid, settings.start, settings.direction),
            steering: Steering,
            frame_rate: FrameRateMeter::default(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Scene showing the checkerboard and the entity at its starting tile.
    pub(crate) fn initial_scene(&self) -> Scene {
        let config = self.controller.config();
        let drawable = self.controller.drawable_positions();
        Scene::new(
            CheckerboardPresentation::covering(config),
            ActorPresentation::from_positions(
                drawable.as_slice(),
                config.tile_length() as f32,
                ACTOR_COLOR,
            ),
        )
    }

    /// Applies the frame's key presses, advances motion and refreshes the scene.
    pub(crate) fn update(&mut self, timestamp: Timestamp, input: FrameInput, scene: &mut Scene) {
        self.steering
            .handle(input.key_codes.iter().copied(), &mut self.commands);
        for command in self.commands.drain(..) {
            self.controller.apply(command, &mut self.events);
        }

        let drawable = self.controller.advance(timestamp, &mut self.events);
        scene.actor.set_positions(drawable.as_slice());

        if let Some(fps) = self.frame_rate.record(timestamp) {
            scene.frame_rate = Some(fps);
        }

        for event in self.events.drain(..) {
            log_event(&event);
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.controller.state().position()
    }
}

fn log_event(event: &Event) {
    match *event {
        Event::DirectionChanged { direction } => {
            tracing::info!(?direction, "direction changed");
        }
        Event::DirectionRejected {
            requested,
            in_flight,
        } => {
            tracing::debug!(?requested, ?in_flight, "reversal ignored");
        }
        Event::StepStarted {
            direction,
            origin,
            target,
            at,
        } => {
            tracing::debug!(
                ?direction,
                from_x = origin.x(),
                from_y = origin.y(),
                to_x = target.x(),
                to_y = target.y(),
                at_ms = at.millis(),
                "step started"
            );
        }
        Event::StepCompleted { position, wrapped } => {
            tracing::debug!(x = position.x(), y = position.y(), wrapped, "step completed");
        }
    }
}

/// Drives the session for a fixed number of frames without a window.
pub(crate) fn run_headless(mut session: Session, frames: u32, frame_ms: f64) -> Position {
    let mut scene = session.initial_scene();
    for frame in 0..frames {
        let timestamp = Timestamp::from_millis(f64::from(frame) * frame_ms);
        session.update(timestamp, FrameInput::default(), &mut scene);
    }
    session.position()
}
