//! Error types for the swipe engine
//!
//! Covers:
//! - Session creation failures (retryable, input stays blocked)
//! - Candidate fetch failures (retryable, queue kept)
//! - Decision recording failures (non-fatal, reported only)
//! - Configuration and lifecycle misuse

use crate::state_machine::Phase;
use crate::types::CardId;

/// Main engine error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Session creation failed; engine stays in `Initializing`
    #[error("session init failed: {0}")]
    SessionInit(#[source] ServiceError),

    /// Candidate prefetch failed; queue unchanged
    #[error("candidate fetch failed: {0}")]
    Fetch(#[source] ServiceError),

    /// Decision persistence failed; local state unaffected
    #[error("recording failed for card {card_id}: {source}")]
    Recording {
        card_id: CardId,
        #[source]
        source: ServiceError,
    },

    /// Input arrived while the session cannot accept it
    #[error("engine not accepting input in phase {phase:?}")]
    NotActive { phase: Phase },

    /// No card is in the head position
    #[error("no head card to decide on")]
    NoHeadCard,

    /// Gesture resolved to no decision; the card snaps back
    #[error(transparent)]
    InvalidGesture(#[from] InvalidGesture),

    /// Illegal lifecycle transition
    #[error("state machine error: {0}")]
    StateMachine(#[from] StateMachineError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Check if the failed operation can be retried by the caller
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SessionInit(e) | Self::Fetch(e) => e.is_transient(),
            Self::NoHeadCard => true,
            _ => false,
        }
    }

    /// Whether the error deserves a retry affordance rather than a toast
    #[inline]
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::SessionInit(_) | Self::Fetch(_))
    }
}

/// Errors reported by the remote preference service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Network-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success response from the backend
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend refused the request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Session unknown to the backend
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

impl ServiceError {
    /// Transport failures and 5xx responses are worth retrying
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Rejected(_) | Self::UnknownSession(_) => false,
        }
    }
}

/// Lifecycle transition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition { from: Phase, to: Phase },
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error("{field} ({value}) must stay below the synthetic gesture constant ({limit})")]
    ThresholdAboveSynthetic {
        field: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("key {key:?} is bound to more than one direction")]
    ConflictingKey { key: String },

    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Classifier outcome when no axis crosses its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("gesture did not resolve to a decision")]
pub struct InvalidGesture;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_error_display() {
        let err = EngineError::SessionInit(ServiceError::Transport("refused".into()));
        assert!(err.to_string().contains("session init failed"));
        assert!(err.is_user_visible());
    }

    #[test]
    fn retryable_classification() {
        assert!(EngineError::Fetch(ServiceError::Transport("x".into())).is_retryable());
        assert!(EngineError::Fetch(ServiceError::Status {
            status: 503,
            message: "busy".into()
        })
        .is_retryable());
        assert!(!EngineError::Fetch(ServiceError::Status {
            status: 400,
            message: "bad".into()
        })
        .is_retryable());
        assert!(!EngineError::NotActive {
            phase: Phase::Completed
        }
        .is_retryable());
    }

    #[test]
    fn recording_error_is_not_user_visible() {
        let err = EngineError::Recording {
            card_id: CardId::new(),
            source: ServiceError::Transport("timeout".into()),
        };
        assert!(!err.is_user_visible());
    }
}
