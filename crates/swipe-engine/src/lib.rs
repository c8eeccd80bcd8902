//! Swipe Engine (swipe-engine)
//!
//! Gesture-driven preference capture: a stack of product cards, each decided
//! with a directional swipe, with candidates prefetched ahead of the user and
//! decisions recorded against a server-side session.
//!
//! The engine is split in two:
//! 1. **Core**: [`session::SessionMachine`] owns all mutable state and returns
//!    the side effects each mutation requires.
//! 2. **Shell**: [`engine::SwipeEngine`] spawns those side effects and applies
//!    their results, discarding any that belong to a torn-down session.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use swipe_engine::prelude::*;
//!
//! let mut engine = SwipeEngine::new(EngineConfig::default(), service)?;
//! engine.start(SessionRequest::default()).await?;
//! engine.settle().await;
//!
//! let keys = KeyboardAdapter::new(&engine.config().keys)?;
//! if let Some(sample) = keys.sample_for("ArrowRight") {
//!     let outcome = engine.dispatch(&sample)?;
//! }
//! ```

#![allow(missing_docs)]

// Core modules
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod input;
pub mod journal;
pub mod prefetch;
pub mod queue;
pub mod recorder;
pub mod session;
pub mod state_machine;
pub mod types;

// Simulation
pub mod test_harness;

// Re-exports
pub use error::*;
pub use types::*;

pub mod prelude {
    pub use crate::api::{
        CandidateQuery, CreatedSession, DecisionPayload, PreferenceService, SessionRequest,
    };
    pub use crate::config::EngineConfig;
    pub use crate::engine::{DispatchOutcome, EngineEvent, SwipeEngine};
    pub use crate::error::{ConfigError, EngineError, ServiceError};
    pub use crate::gesture::{classify, Gesture, MotionSample, Thresholds};
    pub use crate::input::{ButtonAction, KeyboardAdapter, PointerAdapter};
    pub use crate::session::{
        CompletionReason, DisplayState, Phase, SessionSummary, SwipeEngineState,
    };
    pub use crate::types::{
        Card, Decision, ProductRef, SessionId, SessionType, SwipeDirection, Vec2,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if running with strict debugging enabled
pub const fn strict_debug() -> bool {
    cfg!(feature = "strict-debug")
}
