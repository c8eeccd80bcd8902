use proptest::prelude::*;
use swipe_engine::gesture::{classify, resolve, MotionSample, Thresholds};
use swipe_engine::input::synthetic_sample;
use swipe_engine::types::{Decision, SwipeDirection, Vec2};

fn sample(dx: f64, dy: f64, vx: f64, vy: f64) -> MotionSample {
    MotionSample::new(Vec2::new(dx, dy), Vec2::new(vx, vy), 200)
}

#[test]
fn test_distance_triggers() {
    let g = classify(&sample(200.0, 10.0, 0.0, 0.0), &Thresholds::default());
    assert_eq!(g.direction, Some(SwipeDirection::Right));
    assert_eq!(g.decision, Decision::Like);
}

#[test]
fn test_velocity_triggers_short_flick() {
    let g = classify(&sample(-60.0, 5.0, -1200.0, 0.0), &Thresholds::default());
    assert_eq!(g.decision, Decision::Dislike);
}

#[test]
fn test_up_is_superlike() {
    let g = classify(&sample(10.0, -300.0, 0.0, 0.0), &Thresholds::default());
    assert_eq!(g.direction, Some(SwipeDirection::Up));
    assert_eq!(g.decision, Decision::Superlike);
}

#[test]
fn test_down_is_reserved() {
    let g = classify(&sample(0.0, 300.0, 0.0, 0.0), &Thresholds::default());
    assert_eq!(g.direction, Some(SwipeDirection::Down));
    assert_eq!(g.decision, Decision::None);
    assert!(!g.is_triggering());
}

#[test]
fn test_below_thresholds_snaps_back() {
    let g = classify(&sample(120.0, 0.0, 500.0, 0.0), &Thresholds::default());
    assert_eq!(g.direction, None);
    assert!(resolve(&sample(120.0, 0.0, 500.0, 0.0), &Thresholds::default()).is_err());
}

#[test]
fn test_velocity_on_minor_axis_is_ignored() {
    // Horizontal dominates, but only the vertical velocity is large.
    let g = classify(&sample(80.0, 20.0, 0.0, -2000.0), &Thresholds::default());
    assert_eq!(g.decision, Decision::None);
}

#[test]
fn test_non_finite_input_is_rejected() {
    let g = classify(&sample(f64::NAN, 0.0, 0.0, 0.0), &Thresholds::default());
    assert_eq!(g.decision, Decision::None);
    let g = classify(&sample(400.0, 0.0, f64::INFINITY, 0.0), &Thresholds::default());
    assert_eq!(g.decision, Decision::None);
}

#[test]
fn test_gesture_carries_sample_metrics() {
    let s = sample(250.0, 0.0, 900.0, 0.0);
    let g = classify(&s, &Thresholds::default());
    assert_eq!(g.offset, s.offset);
    assert_eq!(g.velocity, s.velocity);
    assert_eq!(g.duration_ms, 200);
}

#[test]
fn test_synthetic_samples_always_trigger() {
    let strict = Thresholds {
        distance: 999.0,
        velocity: 1999.0,
    };
    for (direction, decision) in [
        (SwipeDirection::Left, Decision::Dislike),
        (SwipeDirection::Right, Decision::Like),
        (SwipeDirection::Up, Decision::Superlike),
    ] {
        assert_eq!(classify(&synthetic_sample(direction), &strict).decision, decision);
    }
}

proptest! {
    #[test]
    fn prop_equal_axes_never_trigger(
        m in 0.0f64..5000.0,
        v in -5000.0f64..5000.0,
        sx in prop::bool::ANY,
        sy in prop::bool::ANY,
    ) {
        let dx = if sx { m } else { -m };
        let dy = if sy { m } else { -m };
        let g = classify(&sample(dx, dy, v, v), &Thresholds::default());
        prop_assert_eq!(g.decision, Decision::None);
        prop_assert_eq!(g.direction, None);
    }

    #[test]
    fn prop_direction_follows_dominant_axis(dx in -2000.0f64..2000.0, dy in -2000.0f64..2000.0) {
        let g = classify(&sample(dx, dy, 0.0, 0.0), &Thresholds::default());
        if let Some(direction) = g.direction {
            let expected = if dx.abs() > dy.abs() {
                if dx > 0.0 { SwipeDirection::Right } else { SwipeDirection::Left }
            } else if dy < 0.0 {
                SwipeDirection::Up
            } else {
                SwipeDirection::Down
            };
            prop_assert_eq!(direction, expected);
            prop_assert!(dx.abs().max(dy.abs()) > 150.0);
        }
    }

    #[test]
    fn prop_classification_is_pure(
        dx in -1000.0f64..1000.0,
        dy in -1000.0f64..1000.0,
        vx in -3000.0f64..3000.0,
        vy in -3000.0f64..3000.0,
    ) {
        let s = sample(dx, dy, vx, vy);
        prop_assert_eq!(classify(&s, &Thresholds::default()), classify(&s, &Thresholds::default()));
    }
}
