//! Swipe engine
//!
//! Async shell around [`SessionMachine`]. State is mutated synchronously
//! inside `dispatch`; network work is spawned onto a [`JoinSet`] and its
//! results are applied later by the owner through `apply`, `drain_ready`,
//! `next_completion` or `settle`. Every task is tagged with the engine
//! epoch, and `reset` bumps the epoch so results from a torn-down session
//! are dropped.

use crate::api::{CandidateQuery, DecisionPayload, PreferenceService, SessionRequest};
use crate::config::EngineConfig;
use crate::error::{EngineError, ServiceError};
use crate::gesture::{classify, Gesture, MotionSample, Thresholds};
use crate::journal::DecisionJournal;
use crate::recorder::DecisionRecorder;
use crate::session::{
    DisplayState, FetchEffects, Phase, Session, SessionMachine, SessionSummary, SwipeEngineState,
};
use crate::types::{Card, CardId, ProductRef, SessionId};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

/// Signals emitted to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SessionStarted { session_id: SessionId },
    CardsAppended { added: usize, has_more: bool },
    RecommendationsReady { session_id: SessionId, swipe_count: u32 },
    SessionComplete(SessionSummary),
    /// User-visible; offer a retry. Carries [`EngineError::Fetch`].
    FetchFailed { error: EngineError },
    /// Lightweight notification; progress is kept. Carries [`EngineError::Recording`].
    RecordingFailed { card_id: CardId, error: EngineError },
    /// A completion arrived for a torn-down or finished session
    CompletionDiscarded { epoch: u64 },
}

/// Result of dispatching one motion sample
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// No decision; reset the card to its rest position
    SnapBack(Gesture),
    Decided {
        card: Card,
        gesture: Gesture,
        events: Vec<EngineEvent>,
    },
}

impl DispatchOutcome {
    #[inline]
    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(self, DispatchOutcome::Decided { .. })
    }

    #[must_use]
    pub fn events(&self) -> &[EngineEvent] {
        match self {
            DispatchOutcome::SnapBack(_) => &[],
            DispatchOutcome::Decided { events, .. } => events,
        }
    }
}

/// Result of a spawned side effect
#[derive(Debug)]
pub struct Completion {
    pub epoch: u64,
    pub kind: CompletionKind,
}

#[derive(Debug)]
pub enum CompletionKind {
    Fetched {
        requested: u32,
        result: Result<Vec<ProductRef>, ServiceError>,
    },
    Recorded {
        sequence: u64,
        card_id: CardId,
        result: Result<(), ServiceError>,
    },
}

pub struct SwipeEngine {
    config: EngineConfig,
    thresholds: Thresholds,
    service: Arc<dyn PreferenceService>,
    recorder: DecisionRecorder,
    machine: SessionMachine,
    request: Option<SessionRequest>,
    epoch: u64,
    tasks: JoinSet<Completion>,
}

impl std::fmt::Debug for SwipeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeEngine")
            .field("phase", &self.machine.phase())
            .field("epoch", &self.epoch)
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl SwipeEngine {
    /// Create an engine in `Initializing`. Fails on invalid configuration.
    pub fn new(
        config: EngineConfig,
        service: Arc<dyn PreferenceService>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            thresholds: config.thresholds(),
            recorder: DecisionRecorder::new(Arc::clone(&service)),
            machine: SessionMachine::new(&config),
            config,
            service,
            request: None,
            epoch: 0,
            tasks: JoinSet::new(),
        })
    }

    /// Request a session id and, on success, enter `Active` and start the
    /// initial fill. On failure the engine stays in `Initializing`; call
    /// again to retry.
    pub async fn start(
        &mut self,
        request: SessionRequest,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let phase = self.machine.phase();
        if phase != Phase::Initializing {
            return Err(EngineError::NotActive { phase });
        }

        tracing::info!(
            session_type = ?request.session_type,
            epoch = self.epoch,
            "creating session"
        );
        let created = match self.service.create_session(&request).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, "session creation failed");
                self.request = Some(request);
                return Err(EngineError::SessionInit(e));
            }
        };

        let initial = self.machine.activate(created.id.clone(), &request)?;
        self.request = Some(request);
        if let Some(query) = initial {
            self.spawn_fetch(query);
        }
        tracing::info!(session_id = %created.id, "session active");
        Ok(vec![EngineEvent::SessionStarted {
            session_id: created.id,
        }])
    }

    /// Classify a sample and, if it triggers, apply it to the head card.
    ///
    /// Input outside `Active` is rejected and dropped.
    pub fn dispatch(&mut self, sample: &MotionSample) -> Result<DispatchOutcome, EngineError> {
        let phase = self.machine.phase();
        if !phase.accepts_input() {
            return Err(EngineError::NotActive { phase });
        }

        let gesture = classify(sample, &self.thresholds);
        if !gesture.is_triggering() {
            tracing::trace!(offset = ?gesture.offset, "gesture below thresholds, snapping back");
            return Ok(DispatchOutcome::SnapBack(gesture));
        }

        let effects = self.machine.apply_decision(&gesture)?;
        let mut events = Vec::new();

        if let Some(payload) = effects.payload {
            self.spawn_record(effects.session_id.clone(), effects.sequence, payload);
        }
        if let Some(query) = effects.prefetch {
            self.spawn_fetch(query);
        }
        if let Some(swipe_count) = effects.recommendations_ready {
            tracing::info!(session_id = %effects.session_id, swipe_count, "recommendations ready");
            events.push(EngineEvent::RecommendationsReady {
                session_id: effects.session_id.clone(),
                swipe_count,
            });
        }
        if let Some(summary) = effects.completed {
            events.push(EngineEvent::SessionComplete(summary));
        }

        Ok(DispatchOutcome::Decided {
            card: effects.card,
            gesture,
            events,
        })
    }

    /// Apply one completed side effect.
    pub fn apply(&mut self, completion: Completion) -> Vec<EngineEvent> {
        if completion.epoch != self.epoch {
            tracing::debug!(
                stale_epoch = completion.epoch,
                epoch = self.epoch,
                "discarding completion from previous session"
            );
            return vec![EngineEvent::CompletionDiscarded {
                epoch: completion.epoch,
            }];
        }

        match completion.kind {
            CompletionKind::Fetched { requested, result } => self.apply_fetch(requested, result),
            CompletionKind::Recorded {
                sequence,
                card_id,
                result,
            } => {
                self.machine.apply_record(sequence, &result);
                match result {
                    Ok(()) => Vec::new(),
                    Err(source) => vec![EngineEvent::RecordingFailed {
                        card_id,
                        error: EngineError::Recording { card_id, source },
                    }],
                }
            }
        }
    }

    fn apply_fetch(
        &mut self,
        requested: u32,
        result: Result<Vec<ProductRef>, ServiceError>,
    ) -> Vec<EngineEvent> {
        let effects = match self.machine.apply_fetch(requested, result) {
            Ok(effects) => effects,
            Err(e) => {
                tracing::error!(error = %e, "failed to apply fetch result");
                return Vec::new();
            }
        };

        match effects {
            FetchEffects::Discarded => {
                tracing::debug!(
                    phase = ?self.machine.phase(),
                    "discarding prefetch for inactive session"
                );
                vec![EngineEvent::CompletionDiscarded { epoch: self.epoch }]
            }
            FetchEffects::Failed(error) => {
                tracing::warn!(error = %error, "candidate fetch failed");
                vec![EngineEvent::FetchFailed {
                    error: EngineError::Fetch(error),
                }]
            }
            FetchEffects::Applied {
                added,
                has_more,
                follow_up,
                completed,
            } => {
                tracing::debug!(
                    added,
                    has_more,
                    remaining = self.machine.queue().remaining(),
                    "cards appended"
                );
                let mut events = vec![EngineEvent::CardsAppended { added, has_more }];
                if let Some(query) = follow_up {
                    self.spawn_fetch(query);
                }
                if let Some(summary) = completed {
                    events.push(EngineEvent::SessionComplete(summary));
                }
                events
            }
        }
    }

    /// Apply every completion that is already available, without waiting.
    pub fn drain_ready(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Some(joined) = self.tasks.try_join_next() {
            events.extend(self.apply_joined(joined));
        }
        events
    }

    /// Wait for the next completion and apply it. `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Vec<EngineEvent>> {
        let joined = self.tasks.join_next().await?;
        Some(self.apply_joined(joined))
    }

    /// Wait until every in-flight side effect has completed.
    pub async fn settle(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Some(batch) = self.next_completion().await {
            events.extend(batch);
        }
        events
    }

    /// Retry affordance after a failed fetch. Returns true if a fetch started.
    pub fn retry_fetch(&mut self) -> bool {
        match self.machine.retry_fetch() {
            Some(query) => {
                self.spawn_fetch(query);
                true
            }
            None => false,
        }
    }

    /// Tear down the current session and start a fresh one with the last request.
    pub async fn reset(&mut self) -> Result<Vec<EngineEvent>, EngineError> {
        self.epoch += 1;
        self.machine = SessionMachine::new(&self.config);
        tracing::info!(epoch = self.epoch, in_flight = self.tasks.len(), "engine reset");
        let request = self.request.clone().unwrap_or_default();
        self.start(request).await
    }

    fn apply_joined(&mut self, joined: Result<Completion, JoinError>) -> Vec<EngineEvent> {
        match joined {
            Ok(completion) => self.apply(completion),
            Err(e) => {
                tracing::error!(error = %e, "engine task failed");
                Vec::new()
            }
        }
    }

    fn spawn_fetch(&mut self, query: CandidateQuery) {
        let service = Arc::clone(&self.service);
        let epoch = self.epoch;
        tracing::debug!(
            limit = query.limit,
            session_id = %query.session_id,
            "prefetching candidates"
        );
        self.tasks.spawn(async move {
            let result = service.get_candidates(&query).await;
            Completion {
                epoch,
                kind: CompletionKind::Fetched {
                    requested: query.limit,
                    result,
                },
            }
        });
    }

    fn spawn_record(&mut self, session_id: SessionId, sequence: u64, payload: DecisionPayload) {
        let recorder = self.recorder.clone();
        let epoch = self.epoch;
        let card_id = payload.context.card_id;
        self.tasks.spawn(async move {
            let result = recorder.record(&session_id, &payload).await;
            Completion {
                epoch,
                kind: CompletionKind::Recorded {
                    sequence,
                    card_id,
                    result,
                },
            }
        });
    }

    #[must_use]
    pub fn state(&self) -> SwipeEngineState {
        self.machine.state()
    }

    #[must_use]
    pub fn display_state(&self) -> DisplayState {
        self.machine.display_state()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.machine.session()
    }

    #[inline]
    #[must_use]
    pub fn journal(&self) -> &DecisionJournal {
        self.machine.journal()
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.machine.summary()
    }

    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&Card> {
        self.machine.queue().head()
    }

    /// Cards to render as a stack; only the first is interactive.
    #[must_use]
    pub fn visible_cards(&self) -> &[Card] {
        self.machine.queue().visible_window(self.config.visible_stack_depth)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Spawned side effects not yet applied
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }
}
