//! Gesture classification
//!
//! Pure conversion of a motion sample into a discrete decision:
//! - The dominant axis is the one with strictly larger offset magnitude
//! - Equal magnitudes trigger nothing
//! - On the dominant axis, distance OR velocity past its threshold triggers
//! - The sign of the dominant-axis offset picks the direction

use crate::error::InvalidGesture;
use crate::types::{Decision, SwipeDirection, Vec2};
use serde::{Deserialize, Serialize};

/// Trigger thresholds for pointer gestures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Offset magnitude in px
    pub distance: f64,
    /// Velocity magnitude in px/s
    pub velocity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            distance: 150.0,
            velocity: 800.0,
        }
    }
}

/// Final `(offset, velocity, elapsed)` tuple emitted by an input adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub offset: Vec2,
    pub velocity: Vec2,
    pub elapsed_ms: u64,
    pub start: Vec2,
    pub end: Vec2,
}

impl MotionSample {
    /// Sample anchored at the origin
    #[inline]
    #[must_use]
    pub fn new(offset: Vec2, velocity: Vec2, elapsed_ms: u64) -> Self {
        Self {
            offset,
            velocity,
            elapsed_ms,
            start: Vec2::ZERO,
            end: offset,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_points(mut self, start: Vec2, end: Vec2) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// Normalized gesture record shared by every adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub direction: Option<SwipeDirection>,
    pub decision: Decision,
    pub velocity: Vec2,
    pub offset: Vec2,
    pub duration_ms: u64,
    pub start: Vec2,
    pub end: Vec2,
}

impl Gesture {
    #[inline]
    #[must_use]
    pub fn is_triggering(&self) -> bool {
        !self.decision.is_none()
    }
}

/// Classify a motion sample against thresholds.
///
/// Always yields a `Gesture`; non-triggering samples carry
/// `Decision::None` and the caller snaps the card back.
#[must_use]
pub fn classify(sample: &MotionSample, thresholds: &Thresholds) -> Gesture {
    let direction = dominant_direction(sample, thresholds);
    let decision = direction.map_or(Decision::None, Decision::from_direction);

    Gesture {
        direction,
        decision,
        velocity: sample.velocity,
        offset: sample.offset,
        duration_ms: sample.elapsed_ms,
        start: sample.start,
        end: sample.end,
    }
}

/// Classify and reject anything that does not resolve to a decision.
pub fn resolve(sample: &MotionSample, thresholds: &Thresholds) -> Result<Gesture, InvalidGesture> {
    let gesture = classify(sample, thresholds);
    if gesture.is_triggering() {
        Ok(gesture)
    } else {
        Err(InvalidGesture)
    }
}

fn dominant_direction(sample: &MotionSample, thresholds: &Thresholds) -> Option<SwipeDirection> {
    let MotionSample {
        offset, velocity, ..
    } = *sample;
    if !offset.is_finite() || !velocity.is_finite() {
        return None;
    }

    let ax = offset.x.abs();
    let ay = offset.y.abs();

    if ax > ay {
        let crossed = ax > thresholds.distance || velocity.x.abs() > thresholds.velocity;
        crossed.then(|| {
            if offset.x > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        })
    } else if ay > ax {
        let crossed = ay > thresholds.distance || velocity.y.abs() > thresholds.velocity;
        crossed.then(|| {
            if offset.y < 0.0 {
                SwipeDirection::Up
            } else {
                SwipeDirection::Down
            }
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dx: f64, dy: f64, vx: f64, vy: f64) -> MotionSample {
        MotionSample::new(Vec2::new(dx, dy), Vec2::new(vx, vy), 200)
    }

    #[test]
    fn long_slow_drag_triggers() {
        let g = classify(&sample(160.0, 0.0, 0.0, 0.0), &Thresholds::default());
        assert_eq!(g.direction, Some(SwipeDirection::Right));
        assert_eq!(g.decision, Decision::Like);
    }

    #[test]
    fn short_fast_flick_triggers() {
        let g = classify(&sample(10.0, 0.0, 900.0, 0.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::Like);
    }

    #[test]
    fn below_both_thresholds_is_none() {
        let g = classify(&sample(50.0, 0.0, 100.0, 0.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::None);
        assert!(g.direction.is_none());
    }

    #[test]
    fn equal_magnitudes_never_trigger() {
        let g = classify(&sample(100.0, 100.0, 5000.0, 5000.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::None);
        let g = classify(&sample(-400.0, 400.0, 0.0, 0.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::None);
    }

    #[test]
    fn sign_selects_direction() {
        let t = Thresholds::default();
        assert_eq!(classify(&sample(-200.0, 10.0, 0.0, 0.0), &t).decision, Decision::Dislike);
        assert_eq!(classify(&sample(5.0, -200.0, 0.0, 0.0), &t).decision, Decision::Superlike);
        let down = classify(&sample(5.0, 200.0, 0.0, 0.0), &t);
        assert_eq!(down.direction, Some(SwipeDirection::Down));
        assert_eq!(down.decision, Decision::None);
    }

    #[test]
    fn velocity_on_minor_axis_is_ignored() {
        // Dominant axis is x; a fast vertical velocity must not trigger.
        let g = classify(&sample(40.0, 10.0, 0.0, 5000.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::None);
    }

    #[test]
    fn non_finite_samples_are_none() {
        let g = classify(&sample(f64::NAN, 0.0, 0.0, 0.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::None);
        let g = classify(&sample(300.0, 0.0, f64::INFINITY, 0.0), &Thresholds::default());
        assert_eq!(g.decision, Decision::None);
    }

    #[test]
    fn resolve_rejects_down_and_none() {
        let t = Thresholds::default();
        assert_eq!(resolve(&sample(0.0, 300.0, 0.0, 0.0), &t), Err(InvalidGesture));
        assert_eq!(resolve(&sample(1.0, 0.0, 0.0, 0.0), &t), Err(InvalidGesture));
        assert!(resolve(&sample(-300.0, 0.0, 0.0, 0.0), &t).is_ok());
    }

    #[test]
    fn gesture_carries_sample_geometry() {
        let s = sample(-170.0, 3.0, -40.0, 0.0)
            .with_points(Vec2::new(200.0, 300.0), Vec2::new(30.0, 303.0));
        let g = classify(&s, &Thresholds::default());
        assert_eq!(g.start, Vec2::new(200.0, 300.0));
        assert_eq!(g.end, Vec2::new(30.0, 303.0));
        assert_eq!(g.duration_ms, 200);
    }
}
