//! Decision recorder
//!
//! Persists resolved decisions against the active session. Calls are
//! fire-and-forget from the state machine's perspective; failures are
//! reported back but never roll back local progress.

use crate::api::{DecisionContext, DecisionPayload, PreferenceService};
use crate::error::ServiceError;
use crate::gesture::Gesture;
use crate::types::{Card, SessionId};
use std::sync::Arc;

/// Content type reported for every product card
pub const PRODUCT_CONTENT_TYPE: &str = "product";

#[derive(Clone)]
pub struct DecisionRecorder {
    service: Arc<dyn PreferenceService>,
}

impl std::fmt::Debug for DecisionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionRecorder").finish_non_exhaustive()
    }
}

impl DecisionRecorder {
    #[inline]
    #[must_use]
    pub fn new(service: Arc<dyn PreferenceService>) -> Self {
        Self { service }
    }

    /// Build the wire payload for a decided card.
    ///
    /// `None` when the gesture carries no direction.
    #[must_use]
    pub fn payload(
        card: &Card,
        gesture: &Gesture,
        swipe_index: u32,
        session_elapsed_ms: u64,
    ) -> Option<DecisionPayload> {
        let direction = gesture.direction?;
        Some(DecisionPayload {
            product_id: card.product.id.clone(),
            direction,
            content_type: PRODUCT_CONTENT_TYPE.to_string(),
            context: DecisionContext {
                card_id: card.id,
                queue_position: card.queue_position,
                swipe_index,
                gesture_duration_ms: gesture.duration_ms,
                velocity: gesture.velocity,
                offset: gesture.offset,
                session_elapsed_ms,
            },
        })
    }

    pub async fn record(
        &self,
        session_id: &SessionId,
        payload: &DecisionPayload,
    ) -> Result<(), ServiceError> {
        let result = self.service.record_decision(session_id, payload).await;
        match &result {
            Ok(()) => tracing::debug!(
                session_id = %session_id,
                card_id = %payload.context.card_id,
                direction = %payload.direction,
                "decision recorded"
            ),
            Err(e) => tracing::warn!(
                session_id = %session_id,
                card_id = %payload.context.card_id,
                error = %e,
                "decision recording failed"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{classify, MotionSample, Thresholds};
    use crate::types::{ProductRef, SwipeDirection, Vec2};

    #[test]
    fn payload_carries_context() {
        let card = Card::new(ProductRef::new("p9", "Scarf"), 4);
        let sample = MotionSample::new(Vec2::new(-220.0, 4.0), Vec2::new(-300.0, 0.0), 180);
        let gesture = classify(&sample, &Thresholds::default());

        let payload = DecisionRecorder::payload(&card, &gesture, 5, 12_000).unwrap();
        assert_eq!(payload.direction, SwipeDirection::Left);
        assert_eq!(payload.content_type, "product");
        assert_eq!(payload.context.queue_position, 4);
        assert_eq!(payload.context.swipe_index, 5);
        assert_eq!(payload.context.gesture_duration_ms, 180);
        assert_eq!(payload.context.session_elapsed_ms, 12_000);
        assert_eq!(payload.context.card_id, card.id);
    }

    #[test]
    fn payload_requires_direction() {
        let card = Card::new(ProductRef::new("p1", "Mug"), 0);
        let gesture = classify(
            &MotionSample::new(Vec2::new(3.0, 3.0), Vec2::ZERO, 10),
            &Thresholds::default(),
        );
        assert!(DecisionRecorder::payload(&card, &gesture, 1, 0).is_none());
    }

    #[test]
    fn payload_serializes_direction_lowercase() {
        let card = Card::new(ProductRef::new("p1", "Mug"), 0);
        let gesture = classify(
            &MotionSample::new(Vec2::new(0.0, -400.0), Vec2::ZERO, 10),
            &Thresholds::default(),
        );
        let payload = DecisionRecorder::payload(&card, &gesture, 1, 0).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["direction"], "up");
        assert_eq!(json["product_id"], "p1");
    }
}
