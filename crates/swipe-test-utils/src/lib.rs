//! Testing utilities for the swipe engine workspace
//!
//! Shared test helpers, fixtures, and a scripted backend.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::Arc;
use swipe_engine::api::{
    CandidateQuery, CreatedSession, DecisionPayload, PreferenceService, SessionRequest,
};
use swipe_engine::config::EngineConfig;
use swipe_engine::engine::SwipeEngine;
use swipe_engine::error::ServiceError;
use swipe_engine::gesture::MotionSample;
use swipe_engine::types::{ProductId, ProductRef, SessionId, SwipeDirection, Vec2};
use tokio::sync::oneshot;

/// Call log of a [`ScriptedService`]
#[derive(Debug, Clone, Default)]
pub struct ServiceCalls {
    pub sessions: Vec<SessionRequest>,
    pub queries: Vec<CandidateQuery>,
    pub decisions: Vec<(SessionId, DecisionPayload)>,
}

/// Releases one held `get_candidates` call.
#[derive(Debug)]
pub struct FetchGate(oneshot::Sender<()>);

impl FetchGate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// Backend whose responses are queued up front by the test.
///
/// - `create_session` pops a scripted result, or mints `session-N`
/// - `get_candidates` pops a batch scripted for its session, then a shared
///   batch, or returns an empty one
/// - `record_decision` fails for products marked with `fail_recording`
#[derive(Debug, Default)]
pub struct ScriptedService {
    sessions: Mutex<VecDeque<Result<CreatedSession, ServiceError>>>,
    batches: Mutex<VecDeque<Result<Vec<ProductRef>, ServiceError>>>,
    session_batches: Mutex<HashMap<SessionId, VecDeque<Vec<ProductRef>>>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    failing_records: Mutex<HashSet<ProductId>>,
    minted: Mutex<u64>,
    calls: Mutex<ServiceCalls>,
}

impl ScriptedService {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Service that serves `batches` in order
    #[must_use]
    pub fn with_batches(batches: impl IntoIterator<Item = Vec<ProductRef>>) -> Arc<Self> {
        let service = Self::new();
        for batch in batches {
            service.push_batch(batch);
        }
        service
    }

    pub fn push_session(&self, result: Result<CreatedSession, ServiceError>) {
        self.sessions.lock().push_back(result);
    }

    pub fn fail_next_session(&self, error: ServiceError) {
        self.push_session(Err(error));
    }

    pub fn push_batch(&self, batch: Vec<ProductRef>) {
        self.batches.lock().push_back(Ok(batch));
    }

    /// Batch served only to `session`
    pub fn push_batch_for(&self, session: &str, batch: Vec<ProductRef>) {
        self.session_batches
            .lock()
            .entry(SessionId::new(session))
            .or_default()
            .push_back(batch);
    }

    pub fn fail_next_fetch(&self, error: ServiceError) {
        self.batches.lock().push_back(Err(error));
    }

    /// Hold the next `get_candidates` call until the gate is released.
    #[must_use]
    pub fn hold_next_fetch(&self) -> FetchGate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        FetchGate(tx)
    }

    pub fn fail_recording(&self, product: impl Into<String>) {
        self.failing_records.lock().insert(ProductId::new(product));
    }

    #[must_use]
    pub fn calls(&self) -> ServiceCalls {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.calls.lock().queries.len()
    }

    #[must_use]
    pub fn recorded_count(&self) -> usize {
        self.calls.lock().decisions.len()
    }
}

#[async_trait::async_trait]
impl PreferenceService for ScriptedService {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, ServiceError> {
        self.calls.lock().sessions.push(request.clone());
        if let Some(result) = self.sessions.lock().pop_front() {
            return result;
        }
        let n = {
            let mut minted = self.minted.lock();
            *minted += 1;
            *minted
        };
        Ok(CreatedSession {
            id: SessionId::new(format!("session-{n}")),
        })
    }

    async fn get_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ProductRef>, ServiceError> {
        self.calls.lock().queries.push(query.clone());
        let scripted = self
            .session_batches
            .lock()
            .get_mut(&query.session_id)
            .and_then(VecDeque::pop_front);
        let response = match scripted {
            Some(batch) => Ok(batch),
            None => self.batches.lock().pop_front().unwrap_or_else(|| Ok(Vec::new())),
        };
        let gate = self.gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        response
    }

    async fn record_decision(
        &self,
        session_id: &SessionId,
        payload: &DecisionPayload,
    ) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .decisions
            .push((session_id.clone(), payload.clone()));
        if self.failing_records.lock().contains(&payload.product_id) {
            return Err(ServiceError::Status {
                status: 500,
                message: "write failed".to_string(),
            });
        }
        Ok(())
    }
}

/// Products `p{i}` for every `i` in `range`
pub fn products(range: Range<usize>) -> Vec<ProductRef> {
    range
        .map(|i| ProductRef::new(format!("p{i}"), format!("Product {i}")))
        .collect()
}

/// A decisive drag in `direction` (past the distance threshold, no velocity)
pub fn swipe(direction: SwipeDirection) -> MotionSample {
    MotionSample::new(direction.unit().scale(300.0), Vec2::ZERO, 180)
}

pub fn right() -> MotionSample {
    swipe(SwipeDirection::Right)
}

pub fn left() -> MotionSample {
    swipe(SwipeDirection::Left)
}

pub fn up() -> MotionSample {
    swipe(SwipeDirection::Up)
}

/// A drag that stops short of every threshold
pub fn nudge() -> MotionSample {
    MotionSample::new(Vec2::new(40.0, 5.0), Vec2::new(100.0, 0.0), 250)
}

pub fn create_engine(config: EngineConfig, service: &Arc<ScriptedService>) -> SwipeEngine {
    let service: Arc<dyn PreferenceService> = service.clone();
    SwipeEngine::new(config, service).unwrap()
}

/// Engine that has started its session and applied the initial fill
pub async fn started_engine(config: EngineConfig, service: &Arc<ScriptedService>) -> SwipeEngine {
    let mut engine = create_engine(config, service);
    engine.start(SessionRequest::default()).await.unwrap();
    while engine.head().is_none() && engine.in_flight() > 0 {
        engine.next_completion().await;
    }
    engine
}
