//! On-screen action buttons

use super::synthetic_sample;
use crate::gesture::MotionSample;
use crate::types::SwipeDirection;
use serde::{Deserialize, Serialize};

/// Explicit decision controls rendered under the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    Dislike,
    Like,
    Superlike,
}

impl ButtonAction {
    #[inline]
    #[must_use]
    pub fn direction(self) -> SwipeDirection {
        match self {
            ButtonAction::Dislike => SwipeDirection::Left,
            ButtonAction::Like => SwipeDirection::Right,
            ButtonAction::Superlike => SwipeDirection::Up,
        }
    }

    #[inline]
    #[must_use]
    pub fn sample(self) -> MotionSample {
        synthetic_sample(self.direction())
    }
}
