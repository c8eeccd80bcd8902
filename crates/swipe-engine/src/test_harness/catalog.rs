//! In-memory preference service
//!
//! Serves a generated product catalog with seeded failure injection. State
//! lives behind a `parking_lot::Mutex` that is never held across an await.

use crate::api::{
    CandidateQuery, CreatedSession, DecisionPayload, PreferenceService, SessionRequest,
};
use crate::error::ServiceError;
use crate::types::{ProductId, ProductRef, SessionId};
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const CATEGORIES: &[&str] = &["books", "kitchen", "outdoors", "games", "wellness", "tech"];

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub seed: u64,
    /// Products in the catalog
    pub size: usize,
    /// Probability that `create_session` fails
    pub session_failure_rate: f64,
    /// Probability that `get_candidates` fails
    pub fetch_failure_rate: f64,
    /// Probability that `record_decision` fails
    pub record_failure_rate: f64,
    /// Upper bound of simulated latency per call
    pub max_latency_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            size: 120,
            session_failure_rate: 0.05,
            fetch_failure_rate: 0.05,
            record_failure_rate: 0.02,
            max_latency_ms: 0,
        }
    }
}

/// Call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCalls {
    pub create_session: u64,
    pub get_candidates: u64,
    pub record_decision: u64,
}

#[derive(Debug)]
struct CatalogState {
    rng: StdRng,
    next_session: u64,
    seen: HashMap<SessionId, HashSet<ProductId>>,
    recorded: HashMap<SessionId, u64>,
    calls: CatalogCalls,
}

#[derive(Debug)]
pub struct CatalogService {
    products: Vec<ProductRef>,
    config: CatalogConfig,
    state: Mutex<CatalogState>,
}

impl CatalogService {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let products = (0..config.size)
            .map(|i| {
                let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
                ProductRef::new(format!("sku-{i:05}"), format!("Gift #{i}"))
                    .with_category(category)
                    .with_price_cents(rng.gen_range(500..25_000))
            })
            .collect();
        Self {
            products,
            state: Mutex::new(CatalogState {
                rng,
                next_session: 1,
                seen: HashMap::new(),
                recorded: HashMap::new(),
                calls: CatalogCalls::default(),
            }),
            config,
        }
    }

    #[must_use]
    pub fn calls(&self) -> CatalogCalls {
        self.state.lock().calls
    }

    /// Decisions accepted for a session
    #[must_use]
    pub fn recorded(&self, session_id: &SessionId) -> u64 {
        self.state.lock().recorded.get(session_id).copied().unwrap_or(0)
    }

    #[inline]
    #[must_use]
    pub fn products(&self) -> &[ProductRef] {
        &self.products
    }

    // Draws (fail, latency) under the lock.
    fn roll(&self, failure_rate: f64) -> (bool, u64) {
        let mut state = self.state.lock();
        let fail = state.rng.gen_bool(failure_rate.clamp(0.0, 1.0));
        let latency = if self.config.max_latency_ms == 0 {
            0
        } else {
            state.rng.gen_range(0..=self.config.max_latency_ms)
        };
        (fail, latency)
    }
}

async fn delay(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[async_trait::async_trait]
impl PreferenceService for CatalogService {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, ServiceError> {
        let (fail, latency) = self.roll(self.config.session_failure_rate);
        delay(latency).await;

        let mut state = self.state.lock();
        state.calls.create_session += 1;
        if fail {
            return Err(ServiceError::Status {
                status: 503,
                message: "session store unavailable".to_string(),
            });
        }
        let id = SessionId::new(format!("sess-{:04}", state.next_session));
        tracing::trace!(
            session_id = %id,
            session_type = ?request.session_type,
            "catalog session created"
        );
        state.next_session += 1;
        state.seen.insert(id.clone(), HashSet::new());
        Ok(CreatedSession { id })
    }

    async fn get_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ProductRef>, ServiceError> {
        let (fail, latency) = self.roll(self.config.fetch_failure_rate);
        delay(latency).await;

        let mut state = self.state.lock();
        state.calls.get_candidates += 1;
        if fail {
            return Err(ServiceError::Transport("connection reset".to_string()));
        }
        let seen = state
            .seen
            .get_mut(&query.session_id)
            .ok_or_else(|| ServiceError::UnknownSession(query.session_id.to_string()))?;

        let batch: Vec<ProductRef> = self
            .products
            .iter()
            .filter(|p| query.category.is_none() || p.category == query.category)
            .filter(|p| !query.exclude_seen || !seen.contains(&p.id))
            .take(query.limit as usize)
            .cloned()
            .collect();
        seen.extend(batch.iter().map(|p| p.id.clone()));
        Ok(batch)
    }

    async fn record_decision(
        &self,
        session_id: &SessionId,
        _payload: &DecisionPayload,
    ) -> Result<(), ServiceError> {
        let (fail, latency) = self.roll(self.config.record_failure_rate);
        delay(latency).await;

        let mut state = self.state.lock();
        state.calls.record_decision += 1;
        if !state.seen.contains_key(session_id) {
            return Err(ServiceError::UnknownSession(session_id.to_string()));
        }
        if fail {
            return Err(ServiceError::Status {
                status: 500,
                message: "write failed".to_string(),
            });
        }
        *state.recorded.entry(session_id.clone()).or_default() += 1;
        Ok(())
    }
}
