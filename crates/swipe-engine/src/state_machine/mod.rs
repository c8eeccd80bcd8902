use crate::error::StateMachineError;
use serde::{Deserialize, Serialize};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initializing,
    Active,
    Completing,
    Completed,
}

impl Phase {
    /// Only an active session accepts gestures.
    #[inline]
    #[must_use]
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::Active)
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed)
    }
}

/// Validates a lifecycle transition.
///
/// With the `strict-debug` feature an illegal transition panics instead of
/// returning an error.
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), StateMachineError> {
    if allowed(from, to) {
        Ok(())
    } else {
        #[cfg(feature = "strict-debug")]
        panic!("Illegal phase transition attempted: {:?} -> {:?}", from, to);

        #[allow(unreachable_code)]
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::*;
    match from {
        Initializing => vec![Active],
        Active => vec![Completing],
        Completing => vec![Completed],
        Completed => vec![],
    }
}

fn allowed(from: Phase, to: Phase) -> bool {
    allowed_transitions(from).into_iter().any(|p| p == to)
}
