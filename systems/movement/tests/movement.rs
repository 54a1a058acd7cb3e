use std::time::Duration;

use tile_glide_core::{Command, Direction, Event, GridConfig, Position, Timestamp};
use tile_glide_system_movement::{MotionController, StepPhase};

fn at(millis: f64) -> Timestamp {
    Timestamp::from_millis(millis)
}

fn controller_at(x: f32, y: f32, direction: Direction) -> MotionController {
    MotionController::new(GridConfig::default(), Position::new(x, y), direction)
}

#[test]
fn first_step_waits_a_full_interval_after_the_first_frame() {
    let mut controller = controller_at(0.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    let drawable = controller.advance(at(0.0), &mut events);
    assert_eq!(drawable.primary(), Position::ORIGIN);
    assert_eq!(controller.state().phase(), StepPhase::Idle);
    assert!(events.is_empty());

    let _ = controller.advance(at(199.9), &mut events);
    assert_eq!(controller.state().phase(), StepPhase::Idle);
    assert!(events.is_empty());

    let drawable = controller.advance(at(200.0), &mut events);
    assert_eq!(drawable.primary(), Position::ORIGIN);
    assert_eq!(
        events,
        vec![Event::StepStarted {
            direction: Direction::Right,
            origin: Position::ORIGIN,
            target: Position::new(80.0, 0.0),
            at: at(200.0),
        }]
    );
    events.clear();

    let drawable = controller.advance(at(300.0), &mut events);
    assert_eq!(drawable.primary(), Position::new(40.0, 0.0));
    assert!(events.is_empty());

    let drawable = controller.advance(at(400.0), &mut events);
    assert_eq!(drawable.primary(), Position::new(80.0, 0.0));
    assert_eq!(controller.state().phase(), StepPhase::Idle);
    assert_eq!(
        events,
        vec![Event::StepCompleted {
            position: Position::new(80.0, 0.0),
            wrapped: false,
        }]
    );
}

#[test]
fn first_frame_sets_the_epoch_baseline() {
    let mut controller = controller_at(0.0, 0.0, Direction::Down);
    let mut events = Vec::new();

    let _ = controller.advance(at(5_000.0), &mut events);
    assert_eq!(controller.state().last_step_at(), Some(at(5_000.0)));
    assert!(events.is_empty());

    let _ = controller.advance(at(5_200.0), &mut events);
    assert!(matches!(
        controller.state().phase(),
        StepPhase::Stepping(step) if step.direction == Direction::Down
    ));
}

#[test]
fn stepping_off_the_right_edge_wraps_to_the_left() {
    let mut controller = controller_at(1260.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    let _ = controller.advance(at(0.0), &mut events);
    let _ = controller.advance(at(200.0), &mut events);

    let drawable = controller.advance(at(300.0), &mut events);
    assert_eq!(drawable.primary(), Position::new(1300.0, 0.0));
    assert_eq!(drawable.ghosts(), &[Position::new(20.0, 0.0)]);

    events.clear();
    let drawable = controller.advance(at(400.0), &mut events);
    assert_eq!(drawable.primary(), Position::new(60.0, 0.0));
    assert_eq!(
        events,
        vec![Event::StepCompleted {
            position: Position::new(60.0, 0.0),
            wrapped: true,
        }]
    );
}

#[test]
fn aligned_steps_wrap_onto_tile_boundaries() {
    let mut controller = controller_at(0.0, 640.0, Direction::Down);
    let mut events = Vec::new();

    for millis in [0.0, 200.0, 400.0] {
        let _ = controller.advance(at(millis), &mut events);
    }

    assert_eq!(controller.state().position(), Position::ORIGIN);

    let mut controller = controller_at(0.0, 0.0, Direction::Left);
    for millis in [0.0, 200.0, 400.0] {
        let _ = controller.advance(at(millis), &mut events);
    }

    assert_eq!(controller.state().position(), Position::new(1200.0, 0.0));
}

#[test]
fn reversal_is_rejected_while_a_step_is_in_flight() {
    let mut controller = controller_at(0.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    let _ = controller.advance(at(0.0), &mut events);
    let _ = controller.advance(at(200.0), &mut events);
    events.clear();

    assert!(!controller.request_direction(Direction::Left, &mut events));
    assert_eq!(controller.state().desired_direction(), Direction::Right);
    assert_eq!(
        events,
        vec![Event::DirectionRejected {
            requested: Direction::Left,
            in_flight: Direction::Right,
        }]
    );

    events.clear();
    let _ = controller.advance(at(400.0), &mut events);
    assert_eq!(controller.state().phase(), StepPhase::Idle);

    assert!(controller.request_direction(Direction::Left, &mut events));
    assert_eq!(controller.state().desired_direction(), Direction::Left);
}

#[test]
fn turning_mid_step_never_alters_the_current_target() {
    let mut controller = controller_at(80.0, 80.0, Direction::Right);
    let mut events = Vec::new();

    let _ = controller.advance(at(0.0), &mut events);
    let _ = controller.advance(at(200.0), &mut events);

    for direction in [Direction::Up, Direction::Left, Direction::Down, Direction::Left] {
        let _ = controller.request_direction(direction, &mut events);
        let step = controller.state().in_flight().expect("step in flight");
        assert_eq!(step.direction, Direction::Right);
        assert_eq!(step.target, Position::new(160.0, 80.0));
    }

    // `Left` is still the reversal of the in-flight step, so `Down` sticks.
    assert_eq!(controller.state().desired_direction(), Direction::Down);

    let _ = controller.advance(at(400.0), &mut events);
    assert_eq!(controller.state().position(), Position::new(160.0, 80.0));

    let _ = controller.advance(at(600.0), &mut events);
    let step = controller.state().in_flight().expect("second step in flight");
    assert_eq!(step.direction, Direction::Down);
    assert_eq!(step.target, Position::new(160.0, 160.0));
}

#[test]
fn repeated_requests_for_the_same_direction_are_silent() {
    let mut controller = controller_at(0.0, 0.0, Direction::Up);
    let mut events = Vec::new();

    assert!(controller.request_direction(Direction::Up, &mut events));
    assert!(events.is_empty());

    assert!(controller.request_direction(Direction::Left, &mut events));
    assert_eq!(
        events,
        vec![Event::DirectionChanged {
            direction: Direction::Left,
        }]
    );
}

#[test]
fn step_initiations_respect_the_interval() {
    for (interval, duration) in [(200, 200), (200, 80), (150, 320)] {
        let config = GridConfig::default().with_step_timing(
            Duration::from_millis(interval),
            Duration::from_millis(duration),
        );
        let mut controller = MotionController::new(config, Position::ORIGIN, Direction::Right);
        let mut events = Vec::new();
        let mut now = 0.0;

        for delta in irregular_frame_deltas(600) {
            now += delta;
            let _ = controller.advance(at(now), &mut events);
        }

        let starts: Vec<f64> = events
            .iter()
            .filter_map(|event| match event {
                Event::StepStarted { at, .. } => Some(at.millis()),
                _ => None,
            })
            .collect();
        assert!(starts.len() > 10, "expected steady stepping");

        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= interval as f64,
                "steps at {} and {} are closer than {interval}ms",
                pair[0],
                pair[1],
            );
        }
    }
}

#[test]
fn completion_frame_rests_on_the_target_tile() {
    let mut controller = controller_at(0.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    for millis in [0.0, 200.0, 400.0] {
        let _ = controller.advance(at(millis), &mut events);
    }
    assert_eq!(controller.state().phase(), StepPhase::Idle);
    assert_eq!(controller.state().position(), Position::new(80.0, 0.0));

    let _ = controller.advance(at(450.0), &mut events);
    let starts: Vec<f64> = events
        .iter()
        .filter_map(|event| match event {
            Event::StepStarted { at, .. } => Some(at.millis()),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![200.0, 450.0]);
}

#[test]
fn sixty_frames_per_second_hold_one_frame_per_tile() {
    let mut controller = controller_at(0.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    for frame in 0..=600 {
        let _ = controller.advance(at(f64::from(frame) * 1000.0 / 60.0), &mut events);
    }

    let starts = events
        .iter()
        .filter(|event| matches!(event, Event::StepStarted { .. }))
        .count();
    assert!(
        (40..50).contains(&starts),
        "expected fewer than one step per interval, got {starts}"
    );
}

#[test]
fn interpolation_stays_on_the_step_segment() {
    let mut controller = controller_at(320.0, 160.0, Direction::Up);
    let mut events = Vec::new();
    let duration = controller.config().step_duration();
    let mut now = 0.0;
    let mut last_progress: Option<(Timestamp, f32)> = None;

    for delta in irregular_frame_deltas(400) {
        now += delta;
        let _ = controller.advance(at(now), &mut events);

        let Some(step) = controller.state().in_flight() else {
            last_progress = None;
            continue;
        };

        let progress = step.progress(at(now), duration);
        assert!((0.0..=1.0).contains(&progress));
        if let Some((started_at, previous)) = last_progress {
            if started_at == step.started_at {
                assert!(progress >= previous, "progress went backwards");
            }
        }
        last_progress = Some((step.started_at, progress));

        let position = controller.state().position();
        let (low, high) = ordered(step.origin.y(), step.target.y());
        assert_eq!(position.x(), step.origin.x());
        assert!(position.y() >= low && position.y() <= high);
    }
}

#[test]
fn backwards_clock_clamps_instead_of_overshooting() {
    let mut controller = controller_at(0.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    let _ = controller.advance(at(0.0), &mut events);
    let _ = controller.advance(at(200.0), &mut events);
    let drawable = controller.advance(at(150.0), &mut events);

    assert_eq!(drawable.primary(), Position::ORIGIN);
    assert!(controller.state().in_flight().is_some());
}

#[test]
fn controllers_do_not_share_state() {
    let mut east = controller_at(0.0, 0.0, Direction::Right);
    let mut south = controller_at(0.0, 0.0, Direction::Down);
    let mut events = Vec::new();

    for millis in [0.0, 200.0, 400.0] {
        let _ = east.advance(at(millis), &mut events);
        let _ = south.advance(at(millis), &mut events);
    }
    let _ = east.request_direction(Direction::Up, &mut events);

    assert_eq!(east.state().position(), Position::new(80.0, 0.0));
    assert_eq!(south.state().position(), Position::new(0.0, 80.0));
    assert_eq!(south.state().desired_direction(), Direction::Down);
}

#[test]
fn commands_route_to_the_matching_operation() {
    let mut controller = controller_at(0.0, 0.0, Direction::Right);
    let mut events = Vec::new();

    controller.apply(Command::Advance { timestamp: at(0.0) }, &mut events);
    controller.apply(
        Command::RequestDirection {
            direction: Direction::Down,
        },
        &mut events,
    );
    controller.apply(Command::Advance { timestamp: at(200.0) }, &mut events);

    assert_eq!(
        events,
        vec![
            Event::DirectionChanged {
                direction: Direction::Down,
            },
            Event::StepStarted {
                direction: Direction::Down,
                origin: Position::ORIGIN,
                target: Position::new(0.0, 80.0),
                at: at(200.0),
            },
        ]
    );
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Frame deltas between 4ms and 40ms from a fixed linear congruential sequence.
fn irregular_frame_deltas(count: usize) -> Vec<f64> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            4.0 + ((state >> 33) % 37) as f64
        })
        .collect()
}
