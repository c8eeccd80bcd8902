//! Input adapters feed the classifier through the same entry point

use pretty_assertions::assert_eq;
use swipe_engine::config::EngineConfig;
use swipe_engine::gesture::classify;
use swipe_engine::input::{ButtonAction, KeyBindings, KeyboardAdapter, PointerAdapter};
use swipe_engine::types::{Decision, SwipeDirection, Vec2};

#[test]
fn test_keyboard_and_button_agree() {
    let thresholds = EngineConfig::default().thresholds();
    let keys = KeyboardAdapter::default();

    let pairs = [
        ("ArrowLeft", ButtonAction::Dislike, Decision::Dislike),
        ("ArrowRight", ButtonAction::Like, Decision::Like),
        ("ArrowUp", ButtonAction::Superlike, Decision::Superlike),
    ];
    for (key, button, decision) in pairs {
        let from_key = classify(&keys.sample_for(key).unwrap(), &thresholds);
        let from_button = classify(&button.sample(), &thresholds);
        assert_eq!(from_key.decision, decision);
        assert_eq!(from_key, from_button);
    }
}

#[test]
fn test_letter_aliases() {
    let keys = KeyboardAdapter::default();
    assert_eq!(keys.direction_for("a"), Some(SwipeDirection::Left));
    assert_eq!(keys.direction_for("N"), Some(SwipeDirection::Left));
    assert_eq!(keys.direction_for("d"), Some(SwipeDirection::Right));
    assert_eq!(keys.direction_for("Y"), Some(SwipeDirection::Right));
    assert_eq!(keys.direction_for("w"), Some(SwipeDirection::Up));
    assert_eq!(keys.direction_for("s"), Some(SwipeDirection::Up));
    assert_eq!(keys.direction_for("ArrowDown"), None);
    assert!(keys.sample_for("Enter").is_none());
}

#[test]
fn test_custom_bindings_reject_conflicts() {
    let bindings = KeyBindings {
        left: vec!["j".into()],
        right: vec!["J".into()],
        up: vec![],
    };
    assert!(KeyboardAdapter::new(&bindings).is_err());
}

#[test]
fn test_pointer_flick_triggers_on_velocity() {
    let thresholds = EngineConfig::default().thresholds();
    let mut pointer = PointerAdapter::new();
    pointer.press(7, Vec2::new(100.0, 300.0), 1_000);
    pointer.move_to(7, Vec2::new(70.0, 302.0), 1_016);
    pointer.move_to(7, Vec2::new(40.0, 303.0), 1_032);
    let sample = pointer.release(7, Vec2::new(20.0, 304.0), 1_048).unwrap();

    assert_eq!(sample.offset, Vec2::new(-80.0, 4.0));
    assert!(sample.velocity.x < -800.0);
    let gesture = classify(&sample, &thresholds);
    assert_eq!(gesture.decision, Decision::Dislike);
    assert_eq!(gesture.duration_ms, 48);
    assert_eq!(gesture.start, Vec2::new(100.0, 300.0));
}

#[test]
fn test_pointer_slow_short_drag_snaps_back() {
    let thresholds = EngineConfig::default().thresholds();
    let mut pointer = PointerAdapter::new();
    pointer.press(1, Vec2::ZERO, 0);
    pointer.move_to(1, Vec2::new(30.0, 0.0), 100);
    pointer.move_to(1, Vec2::new(60.0, 0.0), 200);
    let sample = pointer.release(1, Vec2::new(90.0, 0.0), 300).unwrap();
    assert!(!classify(&sample, &thresholds).is_triggering());
}
