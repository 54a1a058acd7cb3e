#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system that translates key codes into motion commands.
//!
//! Key codes use the layout-independent names reported by keyboard event
//! sources (`"ArrowUp"`, `"KeyW"`, ...). Codes without a binding are ignored.

use tile_glide_core::{Command, Direction};

/// Key codes recognised as steering input, with the direction each selects.
pub const KEY_BINDINGS: [(&str, Direction); 8] = [
    ("ArrowUp", Direction::Up),
    ("KeyW", Direction::Up),
    ("ArrowDown", Direction::Down),
    ("KeyS", Direction::Down),
    ("ArrowLeft", Direction::Left),
    ("KeyA", Direction::Left),
    ("ArrowRight", Direction::Right),
    ("KeyD", Direction::Right),
];

/// Looks up the direction bound to a key code.
#[must_use]
pub fn direction_for_code(code: &str) -> Option<Direction> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == code)
        .map(|(_, direction)| *direction)
}

/// Stateless system that turns pressed key codes into direction requests.
#[derive(Debug, Default)]
pub struct Steering;

impl Steering {
    /// Emits one [`Command::RequestDirection`] per recognised code, in order.
    ///
    /// Gating against reversals is left to the motion controller, so a burst of
    /// presses within one frame is forwarded as-is.
    pub fn handle<'a, I>(&self, codes: I, out: &mut Vec<Command>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        out.extend(
            codes
                .into_iter()
                .filter_map(direction_for_code)
                .map(|direction| Command::RequestDirection { direction }),
        );
    }
}
