//! Session state machine
//!
//! Synchronous core that owns every piece of mutable engine state. It never
//! performs I/O: each mutation returns the side effects the caller must
//! launch (recordings, fetches) and the signals it must emit.

use crate::api::{CandidateQuery, DecisionPayload, SessionRequest};
use crate::config::EngineConfig;
use crate::error::{EngineError, InvalidGesture, ServiceError};
use crate::gesture::Gesture;
use crate::journal::{DecisionJournal, RecordStatus};
use crate::prefetch::PrefetchController;
use crate::queue::CardQueue;
use crate::recorder::DecisionRecorder;
use crate::state_machine::validate_transition;
use crate::types::{Card, ProductRef, SessionId, SessionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub use crate::state_machine::Phase;

/// Session record. Finalized once `is_completed` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub session_type: SessionType,
    pub category_focus: Option<String>,
    pub target_recipient: Option<String>,
    pub swipe_count: u32,
    pub like_count: u32,
    pub dislike_count: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// `max_swipes_per_session` reached
    SwipeLimit,
    /// Queue empty and upstream has no more candidates
    Exhausted,
}

/// Final snapshot emitted with `SessionComplete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub session_type: SessionType,
    pub swipe_count: u32,
    pub like_count: u32,
    pub dislike_count: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub reason: CompletionReason,
}

/// Read-only snapshot of the engine aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeEngineState {
    pub phase: Phase,
    pub cards: Vec<Card>,
    pub current_index: usize,
    pub is_loading: bool,
    pub has_more: bool,
    pub session_id: Option<SessionId>,
    pub swipe_count: u32,
    pub like_count: u32,
    pub dislike_count: u32,
}

impl SwipeEngineState {
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.current_index
    }

    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&Card> {
        self.cards.get(self.current_index)
    }
}

/// What the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    /// Waiting for a session id
    Initializing,
    /// Active, no head card, fetch in flight
    Loading,
    /// Active, no head card, last fetch failed; needs a retry
    Stalled,
    /// Head card available
    Ready,
    /// No more candidates upstream
    Exhausted,
    /// Session finished by the swipe ceiling
    Completed,
}

/// Side effects of one applied decision
#[derive(Debug, Clone)]
pub struct DecisionEffects {
    pub card: Card,
    pub session_id: SessionId,
    pub sequence: u64,
    pub payload: Option<DecisionPayload>,
    pub prefetch: Option<CandidateQuery>,
    pub recommendations_ready: Option<u32>,
    pub completed: Option<SessionSummary>,
}

/// Outcome of applying a fetch response
#[derive(Debug, Clone)]
pub enum FetchEffects {
    /// Session no longer active; response dropped
    Discarded,
    Applied {
        added: usize,
        has_more: bool,
        follow_up: Option<CandidateQuery>,
        completed: Option<SessionSummary>,
    },
    Failed(ServiceError),
}

#[derive(Debug)]
pub struct SessionMachine {
    phase: Phase,
    session: Option<Session>,
    queue: CardQueue,
    prefetch: PrefetchController,
    journal: DecisionJournal,
    max_swipes: u32,
    recommendation_interval: u32,
    recommendation_milestone: u32,
    started: Option<Instant>,
    summary: Option<SessionSummary>,
}

impl SessionMachine {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            phase: Phase::Initializing,
            session: None,
            queue: CardQueue::new(),
            prefetch: PrefetchController::new(config.low_water_mark, config.card_preload_count),
            journal: DecisionJournal::default(),
            max_swipes: config.max_swipes_per_session,
            recommendation_interval: config.recommendation_interval.max(1),
            recommendation_milestone: 0,
            started: None,
            summary: None,
        }
    }

    /// Bind the server-assigned id and enter `Active`.
    ///
    /// Returns the initial fill query.
    pub fn activate(
        &mut self,
        id: SessionId,
        request: &SessionRequest,
    ) -> Result<Option<CandidateQuery>, EngineError> {
        validate_transition(self.phase, Phase::Active)?;
        self.phase = Phase::Active;
        self.started = Some(Instant::now());
        self.session = Some(Session {
            id,
            session_type: request.session_type,
            category_focus: request.category_focus.clone(),
            target_recipient: request.target_recipient.clone(),
            swipe_count: 0,
            like_count: 0,
            dislike_count: 0,
            started_at: Utc::now(),
            completed_at: None,
            is_completed: false,
        });
        let limit = self.prefetch.begin_initial();
        Ok(limit.and_then(|limit| self.query(limit)))
    }

    /// Apply one triggering gesture to the head card.
    pub fn apply_decision(&mut self, gesture: &Gesture) -> Result<DecisionEffects, EngineError> {
        if !self.phase.accepts_input() {
            return Err(EngineError::NotActive { phase: self.phase });
        }
        if !gesture.is_triggering() {
            return Err(InvalidGesture.into());
        }
        let card = self.queue.head().cloned().ok_or(EngineError::NoHeadCard)?;
        let Some(direction) = gesture.direction else {
            return Err(InvalidGesture.into());
        };
        let elapsed_ms = self.elapsed_ms();
        let session = self
            .session
            .as_mut()
            .ok_or(EngineError::NotActive { phase: self.phase })?;

        self.queue.advance();
        session.swipe_count += 1;
        if gesture.decision.is_positive() {
            session.like_count += 1;
        } else {
            session.dislike_count += 1;
        }
        let swipe_count = session.swipe_count;
        let session_id = session.id.clone();

        let sequence = self
            .journal
            .append(card.id, card.product.id.clone(), direction);
        let payload = DecisionRecorder::payload(&card, gesture, swipe_count, elapsed_ms);

        let milestone = swipe_count / self.recommendation_interval;
        let recommendations_ready = (milestone > self.recommendation_milestone).then(|| {
            self.recommendation_milestone = milestone;
            swipe_count
        });

        tracing::debug!(
            session_id = %session_id,
            card_id = %card.id,
            direction = %direction,
            swipe_count,
            remaining = self.queue.remaining(),
            "decision applied"
        );

        let completed = match self.completion_reason() {
            Some(reason) => Some(self.complete(reason)?),
            None => None,
        };
        let prefetch = if completed.is_none() {
            self.prefetch
                .begin(self.queue.remaining())
                .and_then(|limit| self.query(limit))
        } else {
            None
        };

        Ok(DecisionEffects {
            card,
            session_id,
            sequence,
            payload,
            prefetch,
            recommendations_ready,
            completed,
        })
    }

    /// Apply a fetch response for a request of `requested` cards.
    pub fn apply_fetch(
        &mut self,
        requested: u32,
        result: Result<Vec<ProductRef>, ServiceError>,
    ) -> Result<FetchEffects, EngineError> {
        if self.phase != Phase::Active {
            self.prefetch.abandon();
            return Ok(FetchEffects::Discarded);
        }
        let products = match result {
            Ok(products) => products,
            Err(e) => {
                self.prefetch.complete_err();
                return Ok(FetchEffects::Failed(e));
            }
        };

        let received = products.len();
        self.prefetch.complete_ok(requested, received);
        let added = self.queue.append(products);
        let has_more = self.prefetch.has_more();

        let completed = match self.completion_reason() {
            Some(reason) => Some(self.complete(reason)?),
            None => None,
        };
        // A batch that added nothing never chains another request.
        let follow_up = if completed.is_none() && added > 0 {
            self.prefetch
                .begin(self.queue.remaining())
                .and_then(|limit| self.query(limit))
        } else {
            None
        };

        Ok(FetchEffects::Applied {
            added,
            has_more,
            follow_up,
            completed,
        })
    }

    /// Start a fetch if one is due and none is in flight.
    pub fn retry_fetch(&mut self) -> Option<CandidateQuery> {
        if self.phase != Phase::Active {
            return None;
        }
        self.prefetch
            .begin(self.queue.remaining())
            .and_then(|limit| self.query(limit))
    }

    /// Update the remote status of a journaled decision.
    pub fn apply_record(&mut self, sequence: u64, result: &Result<(), ServiceError>) -> bool {
        let status = match result {
            Ok(()) => RecordStatus::Acknowledged,
            Err(e) => RecordStatus::Failed(e.to_string()),
        };
        self.journal.mark(sequence, status)
    }

    fn completion_reason(&self) -> Option<CompletionReason> {
        let swipe_count = self.session.as_ref().map_or(0, |s| s.swipe_count);
        if swipe_count >= self.max_swipes {
            Some(CompletionReason::SwipeLimit)
        } else if self.queue.remaining() == 0 && !self.prefetch.has_more() {
            Some(CompletionReason::Exhausted)
        } else {
            None
        }
    }

    fn complete(&mut self, reason: CompletionReason) -> Result<SessionSummary, EngineError> {
        validate_transition(self.phase, Phase::Completing)?;
        self.phase = Phase::Completing;

        let session = self
            .session
            .as_mut()
            .ok_or(EngineError::NotActive { phase: Phase::Completing })?;
        let completed_at = Utc::now();
        session.completed_at = Some(completed_at);
        session.is_completed = true;

        let summary = SessionSummary {
            session_id: session.id.clone(),
            session_type: session.session_type,
            swipe_count: session.swipe_count,
            like_count: session.like_count,
            dislike_count: session.dislike_count,
            started_at: session.started_at,
            completed_at,
            reason,
        };

        validate_transition(self.phase, Phase::Completed)?;
        self.phase = Phase::Completed;
        self.summary = Some(summary.clone());

        tracing::info!(
            session_id = %summary.session_id,
            swipe_count = summary.swipe_count,
            like_count = summary.like_count,
            dislike_count = summary.dislike_count,
            reason = ?reason,
            "session complete"
        );
        Ok(summary)
    }

    fn query(&self, limit: u32) -> Option<CandidateQuery> {
        let session = self.session.as_ref()?;
        Some(CandidateQuery {
            session_id: session.id.clone(),
            limit,
            exclude_seen: true,
            category: session.category_focus.clone(),
        })
    }

    fn elapsed_ms(&self) -> u64 {
        self.started
            .map_or(0, |t| u64::try_from(t.elapsed().as_millis()).unwrap_or(u64::MAX))
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &CardQueue {
        &self.queue
    }

    #[inline]
    #[must_use]
    pub fn prefetch(&self) -> &PrefetchController {
        &self.prefetch
    }

    #[inline]
    #[must_use]
    pub fn journal(&self) -> &DecisionJournal {
        &self.journal
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Snapshot of the aggregate
    #[must_use]
    pub fn state(&self) -> SwipeEngineState {
        let (swipe_count, like_count, dislike_count) = self
            .session
            .as_ref()
            .map_or((0, 0, 0), |s| (s.swipe_count, s.like_count, s.dislike_count));
        SwipeEngineState {
            phase: self.phase,
            cards: self.queue.cards().to_vec(),
            current_index: self.queue.current_index(),
            is_loading: self.prefetch.in_flight(),
            has_more: self.prefetch.has_more(),
            session_id: self.session.as_ref().map(|s| s.id.clone()),
            swipe_count,
            like_count,
            dislike_count,
        }
    }

    #[must_use]
    pub fn display_state(&self) -> DisplayState {
        match self.phase {
            Phase::Initializing => DisplayState::Initializing,
            Phase::Completing | Phase::Completed => match self.summary.as_ref().map(|s| s.reason) {
                Some(CompletionReason::Exhausted) => DisplayState::Exhausted,
                _ => DisplayState::Completed,
            },
            Phase::Active => {
                if self.queue.head().is_some() {
                    DisplayState::Ready
                } else if self.prefetch.in_flight() {
                    DisplayState::Loading
                } else if self.prefetch.has_more() {
                    DisplayState::Stalled
                } else {
                    DisplayState::Exhausted
                }
            }
        }
    }
}
