//! Input adapters
//!
//! Every adapter reduces its raw input to a single [`MotionSample`] that goes
//! through the same classifier entry point, so the engine never learns which
//! adapter produced a decision.

pub mod button;
pub mod keyboard;
pub mod pointer;

pub use button::ButtonAction;
pub use keyboard::{KeyBindings, KeyboardAdapter};
pub use pointer::PointerAdapter;

use crate::gesture::MotionSample;
use crate::types::{SwipeDirection, Vec2};

/// Offset of a synthesized gesture, in px
pub const SYNTHETIC_DISTANCE: f64 = 1_000.0;
/// Velocity of a synthesized gesture, in px/s
pub const SYNTHETIC_VELOCITY: f64 = 2_000.0;
/// Duration reported for a synthesized gesture, in ms
pub const SYNTHETIC_DURATION_MS: u64 = 120;

/// Canonical high-confidence sample for discrete input.
#[must_use]
pub fn synthetic_sample(direction: SwipeDirection) -> MotionSample {
    let unit = direction.unit();
    MotionSample::new(
        unit.scale(SYNTHETIC_DISTANCE),
        unit.scale(SYNTHETIC_VELOCITY),
        SYNTHETIC_DURATION_MS,
    )
    .with_points(Vec2::ZERO, unit.scale(SYNTHETIC_DISTANCE))
}
