//! Pointer/drag adapter.
//!
//! Tracks one captured pointer during a drag and emits a single
//! [`MotionSample`] on release. Release velocity is estimated from the
//! recent sample history.

use crate::gesture::MotionSample;
use crate::types::Vec2;
use std::collections::VecDeque;

/// Bounded history kept per drag.
const HISTORY_SIZE: usize = 20;

/// Only samples within the last 100ms feed the velocity estimate.
const HORIZON_MS: u64 = 100;

/// A pointer that moved less than `MIN_MOVEMENT_PX` over this span is at rest.
const ASSUME_STOPPED_MS: u64 = 40;

const MIN_MOVEMENT_PX: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
struct PointerSample {
    time_ms: u64,
    position: Vec2,
}

#[derive(Debug, Clone)]
struct DragState {
    pointer_id: i32,
    start: Vec2,
    started_at_ms: u64,
    samples: VecDeque<PointerSample>,
}

impl DragState {
    fn push(&mut self, position: Vec2, time_ms: u64) {
        // Out-of-order timestamps are clamped to keep the history monotonic.
        let time_ms = self
            .samples
            .back()
            .map_or(time_ms, |last| time_ms.max(last.time_ms));
        if self.samples.len() == HISTORY_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back(PointerSample { time_ms, position });
    }
}

#[derive(Debug, Clone, Default)]
pub struct PointerAdapter {
    drag: Option<DragState>,
}

impl PointerAdapter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag. Ignored (returns false) while another pointer is captured.
    pub fn press(&mut self, pointer_id: i32, position: Vec2, time_ms: u64) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let mut drag = DragState {
            pointer_id,
            start: position,
            started_at_ms: time_ms,
            samples: VecDeque::with_capacity(HISTORY_SIZE),
        };
        drag.push(position, time_ms);
        self.drag = Some(drag);
        true
    }

    /// Track movement; returns the live offset so the card can follow 1:1.
    pub fn move_to(&mut self, pointer_id: i32, position: Vec2, time_ms: u64) -> Option<Vec2> {
        let drag = self.drag.as_mut().filter(|d| d.pointer_id == pointer_id)?;
        drag.push(position, time_ms);
        Some(position.sub(drag.start))
    }

    /// End the drag and emit the final sample for classification.
    pub fn release(
        &mut self,
        pointer_id: i32,
        position: Vec2,
        time_ms: u64,
    ) -> Option<MotionSample> {
        if self.drag.as_ref()?.pointer_id != pointer_id {
            return None;
        }
        let mut drag = self.drag.take()?;
        drag.push(position, time_ms);

        let end_ms = drag.samples.back().map_or(time_ms, |s| s.time_ms);
        let velocity = estimate_velocity(&drag.samples);
        Some(
            MotionSample::new(
                position.sub(drag.start),
                velocity,
                end_ms.saturating_sub(drag.started_at_ms),
            )
            .with_points(drag.start, position),
        )
    }

    /// Abort the drag without emitting anything.
    pub fn cancel(&mut self, pointer_id: i32) -> bool {
        if self.drag.as_ref().is_some_and(|d| d.pointer_id == pointer_id) {
            self.drag = None;
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}

fn estimate_velocity(samples: &VecDeque<PointerSample>) -> Vec2 {
    let Some(newest) = samples.back().copied() else {
        return Vec2::ZERO;
    };

    let rest_anchor = samples
        .iter()
        .rev()
        .find(|s| newest.time_ms - s.time_ms >= ASSUME_STOPPED_MS);
    if let Some(anchor) = rest_anchor {
        let moved = newest.position.sub(anchor.position);
        if moved.x.abs().max(moved.y.abs()) < MIN_MOVEMENT_PX {
            return Vec2::ZERO;
        }
    }

    let horizon_start = newest.time_ms.saturating_sub(HORIZON_MS);
    let oldest = samples
        .iter()
        .find(|s| s.time_ms >= horizon_start)
        .copied()
        .unwrap_or(newest);

    let dt_ms = newest.time_ms - oldest.time_ms;
    if dt_ms == 0 {
        return Vec2::ZERO;
    }
    newest
        .position
        .sub(oldest.position)
        .scale(1000.0 / dt_ms as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_emits_offset_and_velocity() {
        let mut p = PointerAdapter::new();
        assert!(p.press(1, Vec2::new(0.0, 0.0), 0));
        assert_eq!(p.move_to(1, Vec2::new(50.0, 0.0), 50), Some(Vec2::new(50.0, 0.0)));
        p.move_to(1, Vec2::new(100.0, 0.0), 80);
        let s = p.release(1, Vec2::new(120.0, 0.0), 100).unwrap();

        assert_eq!(s.offset, Vec2::new(120.0, 0.0));
        assert_eq!(s.elapsed_ms, 100);
        assert!((s.velocity.x - 1200.0).abs() < 1e-9);
        assert_eq!(s.velocity.y, 0.0);
        assert!(!p.is_dragging());
    }

    #[test]
    fn resting_pointer_has_zero_velocity() {
        let mut p = PointerAdapter::new();
        p.press(1, Vec2::ZERO, 0);
        p.move_to(1, Vec2::new(200.0, 0.0), 10);
        let s = p.release(1, Vec2::new(200.0, 0.0), 200).unwrap();
        assert_eq!(s.velocity, Vec2::ZERO);
        assert_eq!(s.offset.x, 200.0);
    }

    #[test]
    fn second_pointer_is_ignored() {
        let mut p = PointerAdapter::new();
        assert!(p.press(1, Vec2::ZERO, 0));
        assert!(!p.press(2, Vec2::ZERO, 5));
        assert!(p.move_to(2, Vec2::new(10.0, 0.0), 10).is_none());
        assert!(p.release(2, Vec2::new(10.0, 0.0), 20).is_none());
        assert!(p.is_dragging());
    }

    #[test]
    fn cancel_drops_drag() {
        let mut p = PointerAdapter::new();
        p.press(3, Vec2::ZERO, 0);
        assert!(!p.cancel(4));
        assert!(p.cancel(3));
        assert!(p.release(3, Vec2::new(400.0, 0.0), 50).is_none());
    }

    #[test]
    fn history_is_bounded() {
        let mut p = PointerAdapter::new();
        p.press(1, Vec2::ZERO, 0);
        for i in 1..100u64 {
            p.move_to(1, Vec2::new(i as f64, 0.0), i);
        }
        let s = p.release(1, Vec2::new(100.0, 0.0), 100).unwrap();
        // Start point survives history eviction.
        assert_eq!(s.start, Vec2::ZERO);
        assert_eq!(s.offset.x, 100.0);
    }
}
