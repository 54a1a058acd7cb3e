#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile-stepping motion system that turns directional intent and frame
//! timestamps into a smoothly interpolated, wrapping position.
//!
//! A [`MotionController`] owns the [`MotionState`] of exactly one entity. The
//! host calls [`MotionController::advance`] once per frame and forwards the
//! returned [`DrawablePositions`] to a renderer; input collaborators call
//! [`MotionController::request_direction`] between frames. Both entry points
//! report what changed as [`Event`] values.
//!
//! Timestamps are expected to be non-decreasing. A clock that runs backwards is
//! not detected: progress clamps at zero and no new step starts until the clock
//! catches up again.
//!
//! The frame that observes a step's completion leaves the entity resting on the
//! target tile, and the next step starts on a later frame. When the step
//! duration equals the interval this costs up to one frame per tile, so at 60
//! frames per second the default 200ms timing covers about 44 tiles in ten
//! seconds rather than 50.

use std::time::Duration;

use tile_glide_core::{Command, Direction, Event, GridConfig, Position, Timestamp};

/// Owns the motion state of a single entity and advances it frame by frame.
#[derive(Clone, Debug)]
pub struct MotionController {
    config: GridConfig,
    state: MotionState,
}

impl MotionController {
    /// Creates a controller resting at `start` and heading in `direction`.
    ///
    /// The start position is wrapped into the world rectangle.
    #[must_use]
    pub fn new(config: GridConfig, start: Position, direction: Direction) -> Self {
        Self {
            state: MotionState {
                position: wrap(start, &config),
                desired_direction: direction,
                phase: StepPhase::Idle,
                last_step_at: None,
            },
            config,
        }
    }

    /// Applies a single command, appending the resulting events to `out`.
    pub fn apply(&mut self, command: Command, out: &mut Vec<Event>) {
        match command {
            Command::RequestDirection { direction } => {
                let _ = self.request_direction(direction, out);
            }
            Command::Advance { timestamp } => {
                let _ = self.advance(timestamp, out);
            }
        }
    }

    /// Updates the direction used by the next step.
    ///
    /// Requests that would reverse the step currently in flight are rejected and
    /// reported through [`Event::DirectionRejected`]. While idle every direction
    /// is accepted. Returns whether the request was accepted.
    pub fn request_direction(&mut self, direction: Direction, out: &mut Vec<Event>) -> bool {
        if let StepPhase::Stepping(step) = self.state.phase {
            if direction == step.direction.opposite() {
                out.push(Event::DirectionRejected {
                    requested: direction,
                    in_flight: step.direction,
                });
                return false;
            }
        }

        if self.state.desired_direction != direction {
            self.state.desired_direction = direction;
            out.push(Event::DirectionChanged { direction });
        }
        true
    }

    /// Advances the motion clock to `timestamp` and returns what to draw.
    ///
    /// The first call only records the epoch baseline. Afterwards an idle
    /// controller begins a new step once `step_interval` has elapsed since the
    /// previous one, interpolates the in-flight step, and snaps onto the
    /// wrapped target in the same call that observes the step's completion.
    pub fn advance(&mut self, timestamp: Timestamp, out: &mut Vec<Event>) -> DrawablePositions {
        let last_step_at = *self.state.last_step_at.get_or_insert(timestamp);

        if matches!(self.state.phase, StepPhase::Idle)
            && timestamp.millis_since(last_step_at) >= duration_millis(self.config.step_interval())
        {
            self.begin_step(timestamp, out);
        }

        if let StepPhase::Stepping(step) = self.state.phase {
            let duration = self.config.step_duration();
            self.state.position = step
                .origin
                .lerp(step.target, step.progress(timestamp, duration));

            if step.is_complete(timestamp, duration) {
                let position = wrap(step.target, &self.config);
                self.state.position = position;
                self.state.phase = StepPhase::Idle;
                out.push(Event::StepCompleted {
                    position,
                    wrapped: position != step.target,
                });
            }
        }

        self.drawable_positions()
    }

    /// Drawable positions for the current state, including seam ghosts.
    #[must_use]
    pub fn drawable_positions(&self) -> DrawablePositions {
        DrawablePositions::around(self.state.position, &self.config)
    }

    /// Read-only access to the motion state.
    #[must_use]
    pub const fn state(&self) -> &MotionState {
        &self.state
    }

    /// Grid configuration the controller steps across.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    fn begin_step(&mut self, timestamp: Timestamp, out: &mut Vec<Event>) {
        let direction = self.state.desired_direction;
        let (dx, dy) = direction.unit_vector();
        let tile = self.config.tile_length() as f32;
        let origin = self.state.position;
        let target = origin.offset(dx as f32 * tile, dy as f32 * tile);

        self.state.phase = StepPhase::Stepping(Step {
            direction,
            origin,
            target,
            started_at: timestamp,
        });
        self.state.last_step_at = Some(timestamp);
        out.push(Event::StepStarted {
            direction,
            origin,
            target,
            at: timestamp,
        });
    }
}

/// Mutable motion state owned by a [`MotionController`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    position: Position,
    desired_direction: Direction,
    phase: StepPhase,
    last_step_at: Option<Timestamp>,
}

impl MotionState {
    /// Current position, possibly between tiles while a step is in flight.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Direction the next step will use.
    #[must_use]
    pub const fn desired_direction(&self) -> Direction {
        self.desired_direction
    }

    /// Whether the controller is idle or sliding between tiles.
    #[must_use]
    pub const fn phase(&self) -> StepPhase {
        self.phase
    }

    /// The step currently in flight, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<Step> {
        match self.phase {
            StepPhase::Idle => None,
            StepPhase::Stepping(step) => Some(step),
        }
    }

    /// Timestamp of the most recent step initiation, or the epoch baseline.
    ///
    /// `None` until the first frame has been observed.
    #[must_use]
    pub const fn last_step_at(&self) -> Option<Timestamp> {
        self.last_step_at
    }
}

/// Discrete phase of the motion state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepPhase {
    /// No step is in flight.
    Idle,
    /// A step is sliding from its origin to its target.
    Stepping(Step),
}

/// A single tile-to-tile slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Direction that produced the step.
    pub direction: Direction,
    /// Position the step departed from.
    pub origin: Position,
    /// Unwrapped destination, exactly one tile away from the origin.
    pub target: Position,
    /// Timestamp at which the step began.
    pub started_at: Timestamp,
}

impl Step {
    /// Fraction of the slide completed at `timestamp`, clamped to `0.0..=1.0`.
    ///
    /// A zero `duration` completes immediately.
    #[must_use]
    pub fn progress(&self, timestamp: Timestamp, duration: Duration) -> f32 {
        let duration = duration_millis(duration);
        if duration <= 0.0 {
            return 1.0;
        }
        (timestamp.millis_since(self.started_at) / duration).clamp(0.0, 1.0) as f32
    }

    /// Whether the slide has finished by `timestamp`.
    #[must_use]
    pub fn is_complete(&self, timestamp: Timestamp, duration: Duration) -> bool {
        timestamp.millis_since(self.started_at) >= duration_millis(duration)
    }
}

/// Reduces a position into `[0, width) x [0, height)` using floor-modulo.
///
/// A component of `-5` wraps to `width - 5`. The result is stable under
/// repeated application.
#[must_use]
pub fn wrap(position: Position, config: &GridConfig) -> Position {
    Position::new(
        wrap_axis(position.x(), config.world_width() as f32),
        wrap_axis(position.y(), config.world_height() as f32),
    )
}

fn wrap_axis(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // Tiny negative inputs round up to the extent itself.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

fn duration_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

/// The entity's position plus up to two copies shifted by a world extent.
///
/// A tile that straddles a world seam is drawn on both sides so it appears
/// whole. Copies are derived from the position and never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawablePositions {
    buffer: [Position; 3],
    len: usize,
}

impl DrawablePositions {
    /// Computes the drawable copies for a tile anchored at `position`.
    #[must_use]
    pub fn around(position: Position, config: &GridConfig) -> Self {
        let mut positions = Self {
            buffer: [position; 3],
            len: 1,
        };

        let tile = config.tile_length() as f32;
        let width = config.world_width() as f32;
        let height = config.world_height() as f32;

        if position.x() < 0.0 {
            positions.push(position.offset(width, 0.0));
        } else if position.x() > width - tile {
            positions.push(position.offset(-width, 0.0));
        }

        if position.y() < 0.0 {
            positions.push(position.offset(0.0, height));
        } else if position.y() > height - tile {
            positions.push(position.offset(0.0, -height));
        }

        positions
    }

    fn push(&mut self, position: Position) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = position;
            self.len += 1;
        }
    }

    /// The authoritative position.
    #[must_use]
    pub const fn primary(&self) -> Position {
        self.buffer[0]
    }

    /// Seam copies, if the tile currently straddles a boundary.
    #[must_use]
    pub fn ghosts(&self) -> &[Position] {
        &self.buffer[1..self.len]
    }

    /// Every position that should be drawn, primary first.
    #[must_use]
    pub fn as_slice(&self) -> &[Position] {
        &self.buffer[..self.len]
    }

    /// Number of copies to draw, always at least one.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a primary position is always present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}
