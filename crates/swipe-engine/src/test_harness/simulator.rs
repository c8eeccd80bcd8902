//! Swipe session simulator
//!
//! Drives full sessions against a [`CatalogService`] with randomized input
//! from every adapter and checks the engine invariants after each session:
//! - counters agree (`like + dislike == swipe`)
//! - the swipe ceiling is never exceeded
//! - no product is decided twice in a session
//! - every decision is journaled exactly once

use super::catalog::{CatalogConfig, CatalogService};
use crate::api::SessionRequest;
use crate::config::EngineConfig;
use crate::engine::{DispatchOutcome, EngineEvent, SwipeEngine};
use crate::error::EngineError;
use crate::gesture::MotionSample;
use crate::input::{synthetic_sample, ButtonAction, KeyboardAdapter, PointerAdapter};
use crate::journal::RecordStatus;
use crate::session::{CompletionReason, DisplayState};
use crate::types::{SessionId, SwipeDirection, Vec2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Attempts at `create_session` before a session is abandoned
const MAX_START_ATTEMPTS: u32 = 5;

/// Consecutive fetch retries before a stalled session is abandoned
const MAX_FETCH_RETRIES: u32 = 10;

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Sessions to run back to back
    pub sessions: u64,
    pub engine: EngineConfig,
    pub catalog: CatalogConfig,
    /// Probability that a drag stops short of the thresholds
    pub hesitation_rate: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sessions: 20,
            engine: EngineConfig::default(),
            catalog: CatalogConfig::default(),
            hesitation_rate: 0.1,
        }
    }
}

/// Input adapter that produced a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Pointer,
    Keyboard,
    Button,
}

/// Statistics for simulation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulatorStats {
    pub sessions_started: u64,
    pub sessions_abandoned: u64,
    pub start_failures: u64,
    pub completed_by_limit: u64,
    pub completed_exhausted: u64,
    pub decisions: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub superlikes: u64,
    pub snap_backs: u64,
    pub pointer_inputs: u64,
    pub keyboard_inputs: u64,
    pub button_inputs: u64,
    pub fetch_failures: u64,
    pub fetch_retries: u64,
    pub recording_failures: u64,
    pub discarded_completions: u64,
    pub recommendation_signals: u64,
}

/// An invariant broken during simulation
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub session_id: Option<SessionId>,
    pub detail: String,
}

/// Final report from simulator
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub sessions: u64,
    pub stats: SimulatorStats,
    pub violations: Vec<Violation>,
}

impl SimulationReport {
    /// Check if simulation passed all criteria
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let s = &self.stats;
        let mut report = String::new();

        report.push_str("=== Swipe Simulator Report ===\n\n");
        report.push_str(&format!("Seed: {}\n", self.seed));
        report.push_str(&format!("Sessions Requested: {}\n", self.sessions));
        report.push_str(&format!("Sessions Started: {}\n", s.sessions_started));
        report.push_str(&format!("Sessions Abandoned: {}\n", s.sessions_abandoned));
        report.push_str(&format!("Start Failures: {}\n", s.start_failures));
        report.push_str(&format!("Completed (swipe limit): {}\n", s.completed_by_limit));
        report.push_str(&format!("Completed (exhausted): {}\n", s.completed_exhausted));
        report.push_str(&format!(
            "Decisions: {} (like {}, dislike {}, superlike {})\n",
            s.decisions, s.likes, s.dislikes, s.superlikes
        ));
        report.push_str(&format!("Snap Backs: {}\n", s.snap_backs));
        report.push_str(&format!(
            "Inputs: pointer {}, keyboard {}, button {}\n",
            s.pointer_inputs, s.keyboard_inputs, s.button_inputs
        ));
        report.push_str(&format!(
            "Fetch Failures: {} (retries {})\n",
            s.fetch_failures, s.fetch_retries
        ));
        report.push_str(&format!("Recording Failures: {}\n", s.recording_failures));
        report.push_str(&format!("Discarded Completions: {}\n", s.discarded_completions));
        report.push_str(&format!("Recommendation Signals: {}\n", s.recommendation_signals));
        report.push_str(&format!("Violations: {}\n", self.violations.len()));

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let session = v.session_id.as_ref().map_or("-", SessionId::as_str);
                report.push_str(&format!("{}. [{}] {}\n", i + 1, session, v.detail));
            }
        }

        report.push_str(&format!(
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        ));
        report
    }
}

/// Run the swipe simulator
pub async fn run_simulator(config: SimulatorConfig) -> Result<SimulationReport, EngineError> {
    config.engine.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let catalog = Arc::new(CatalogService::new(CatalogConfig {
        seed: config.seed,
        ..config.catalog.clone()
    }));
    let keyboard = KeyboardAdapter::new(&config.engine.keys)?;

    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();

    for n in 0..config.sessions {
        let mut engine = SwipeEngine::new(config.engine.clone(), catalog.clone())?;
        let request = session_request(&mut rng);

        if !start_with_retry(&mut engine, request, &mut stats).await {
            stats.sessions_abandoned += 1;
            continue;
        }
        stats.sessions_started += 1;

        let mut shown = HashSet::new();
        let mut retries = 0u32;
        let mut events = engine.drain_ready();

        loop {
            tally(&events, &mut stats);
            events.clear();

            match engine.display_state() {
                DisplayState::Ready => {
                    retries = 0;
                    let (source, sample) = random_input(&mut rng, &keyboard, &config);
                    match source {
                        Source::Pointer => stats.pointer_inputs += 1,
                        Source::Keyboard => stats.keyboard_inputs += 1,
                        Source::Button => stats.button_inputs += 1,
                    }
                    match engine.dispatch(&sample)? {
                        DispatchOutcome::SnapBack(_) => stats.snap_backs += 1,
                        DispatchOutcome::Decided {
                            card,
                            gesture,
                            events: decided,
                        } => {
                            stats.decisions += 1;
                            if !shown.insert(card.product.id.clone()) {
                                violations.push(Violation {
                                    session_id: engine.session().map(|s| s.id.clone()),
                                    detail: format!("product {} decided twice", card.product.id),
                                });
                            }
                            match gesture.direction {
                                Some(SwipeDirection::Right) => stats.likes += 1,
                                Some(SwipeDirection::Left) => stats.dislikes += 1,
                                Some(SwipeDirection::Up) => stats.superlikes += 1,
                                _ => {}
                            }
                            events.extend(decided);
                        }
                    }
                    events.extend(engine.drain_ready());
                }
                DisplayState::Loading => match engine.next_completion().await {
                    Some(batch) => events.extend(batch),
                    None => break,
                },
                DisplayState::Stalled => {
                    if retries >= MAX_FETCH_RETRIES {
                        stats.sessions_abandoned += 1;
                        break;
                    }
                    retries += 1;
                    stats.fetch_retries += 1;
                    engine.retry_fetch();
                }
                DisplayState::Completed
                | DisplayState::Exhausted
                | DisplayState::Initializing => break,
            }
        }

        tally(&engine.settle().await, &mut stats);
        tracing::info!(
            n,
            session_id = ?engine.session().map(|s| s.id.as_str()),
            swipe_count = engine.state().swipe_count,
            display = ?engine.display_state(),
            "simulated session finished"
        );
        check_invariants(&engine, &config.engine, &mut violations);
    }

    Ok(SimulationReport {
        seed: config.seed,
        sessions: config.sessions,
        stats,
        violations,
    })
}

async fn start_with_retry(
    engine: &mut SwipeEngine,
    request: SessionRequest,
    stats: &mut SimulatorStats,
) -> bool {
    for attempt in 1..=MAX_START_ATTEMPTS {
        match engine.start(request.clone()).await {
            Ok(_) => return true,
            Err(e) if e.is_retryable() => {
                stats.start_failures += 1;
                tracing::debug!(attempt, error = %e, "retrying session start");
            }
            Err(e) => {
                stats.start_failures += 1;
                tracing::warn!(error = %e, "session start failed permanently");
                return false;
            }
        }
    }
    false
}

fn session_request(rng: &mut StdRng) -> SessionRequest {
    let request = SessionRequest::default();
    if rng.gen_bool(0.3) {
        request.with_recipient(format!("friend-{}", rng.gen_range(1..100)))
    } else {
        request
    }
}

fn random_direction(rng: &mut StdRng) -> SwipeDirection {
    match rng.gen_range(0..10) {
        0..=3 => SwipeDirection::Right,
        4..=8 => SwipeDirection::Left,
        _ => SwipeDirection::Up,
    }
}

fn random_input(
    rng: &mut StdRng,
    keyboard: &KeyboardAdapter,
    config: &SimulatorConfig,
) -> (Source, MotionSample) {
    let direction = random_direction(rng);
    match rng.gen_range(0..3) {
        0 => {
            let key = match direction {
                SwipeDirection::Left => config.engine.keys.left.first(),
                SwipeDirection::Right => config.engine.keys.right.first(),
                _ => config.engine.keys.up.first(),
            };
            let sample = key
                .and_then(|k| keyboard.sample_for(k))
                .unwrap_or_else(|| synthetic_sample(direction));
            (Source::Keyboard, sample)
        }
        1 => {
            let action = match direction {
                SwipeDirection::Left => ButtonAction::Dislike,
                SwipeDirection::Right => ButtonAction::Like,
                _ => ButtonAction::Superlike,
            };
            (Source::Button, action.sample())
        }
        _ => {
            let hesitate = rng.gen_bool(config.hesitation_rate.clamp(0.0, 1.0));
            (Source::Pointer, simulate_drag(rng, direction, hesitate, config))
        }
    }
}

/// Feed a drag through the pointer adapter, frame by frame.
fn simulate_drag(
    rng: &mut StdRng,
    direction: SwipeDirection,
    hesitate: bool,
    config: &SimulatorConfig,
) -> MotionSample {
    let distance = if hesitate {
        config.engine.distance_threshold * rng.gen_range(0.1..0.6)
    } else {
        config.engine.distance_threshold * rng.gen_range(1.1..2.0)
    };
    let frames: u64 = rng.gen_range(6..20);
    let target = direction.unit().scale(distance);
    let jitter = Vec2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));

    let mut pointer = PointerAdapter::new();
    pointer.press(1, Vec2::ZERO, 0);
    for f in 1..frames {
        let t = f as f64 / frames as f64;
        pointer.move_to(1, target.scale(t).add(jitter.scale(t)), f * 16);
    }
    // A hesitating drag rests before release so it carries no velocity.
    let release_at = if hesitate { frames * 16 + 200 } else { frames * 16 };
    pointer
        .release(1, target, release_at)
        .unwrap_or_else(|| MotionSample::new(target, Vec2::ZERO, release_at))
}

fn tally(events: &[EngineEvent], stats: &mut SimulatorStats) {
    for event in events {
        match event {
            EngineEvent::RecommendationsReady { .. } => stats.recommendation_signals += 1,
            EngineEvent::SessionComplete(summary) => match summary.reason {
                CompletionReason::SwipeLimit => stats.completed_by_limit += 1,
                CompletionReason::Exhausted => stats.completed_exhausted += 1,
            },
            EngineEvent::FetchFailed { .. } => stats.fetch_failures += 1,
            EngineEvent::RecordingFailed { .. } => stats.recording_failures += 1,
            EngineEvent::CompletionDiscarded { .. } => stats.discarded_completions += 1,
            EngineEvent::SessionStarted { .. } | EngineEvent::CardsAppended { .. } => {}
        }
    }
}

fn check_invariants(engine: &SwipeEngine, config: &EngineConfig, violations: &mut Vec<Violation>) {
    let state = engine.state();
    let session_id = state.session_id.clone();
    let mut flag = |detail: String| {
        violations.push(Violation {
            session_id: session_id.clone(),
            detail,
        });
    };

    if state.like_count + state.dislike_count != state.swipe_count {
        flag(format!(
            "counters disagree: {} likes + {} dislikes != {} swipes",
            state.like_count, state.dislike_count, state.swipe_count
        ));
    }
    if state.swipe_count > config.max_swipes_per_session {
        flag(format!("swipe ceiling exceeded: {}", state.swipe_count));
    }
    if state.current_index > state.cards.len() {
        flag(format!("cursor {} past queue end {}", state.current_index, state.cards.len()));
    }
    let unique: HashSet<_> = state.cards.iter().map(|c| &c.product.id).collect();
    if unique.len() != state.cards.len() {
        flag("duplicate product in queue".to_string());
    }
    let journal = engine.journal();
    if journal.len() != state.swipe_count as usize {
        flag(format!("journal has {} entries for {} swipes", journal.len(), state.swipe_count));
    }
    let pending = journal.count(|s| matches!(s, RecordStatus::Pending));
    if pending > 0 {
        flag(format!("{pending} decisions still pending after settle"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> SimulatorConfig {
        SimulatorConfig {
            sessions: 5,
            catalog: CatalogConfig {
                size: 40,
                ..CatalogConfig::default()
            },
            ..SimulatorConfig::default()
        }
    }

    #[tokio::test]
    async fn simulation_passes_invariants() {
        let report = run_simulator(quiet()).await.unwrap();
        assert!(report.passed(), "{}", report.generate_text());
        assert!(report.stats.decisions > 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn simulation_is_reproducible() {
        let flaky = || SimulatorConfig {
            catalog: CatalogConfig {
                fetch_failure_rate: 0.3,
                record_failure_rate: 0.3,
                ..quiet().catalog
            },
            ..quiet()
        };
        let a = run_simulator(flaky()).await.unwrap();
        let b = run_simulator(flaky()).await.unwrap();
        assert!(a.stats.fetch_failures + a.stats.recording_failures > 0);
        assert_eq!(
            serde_json::to_value(&a.stats).unwrap(),
            serde_json::to_value(&b.stats).unwrap()
        );
    }

    #[tokio::test]
    async fn rejects_invalid_engine_config() {
        let config = SimulatorConfig {
            engine: EngineConfig::default().with_max_swipes(0),
            ..SimulatorConfig::default()
        };
        assert!(run_simulator(config).await.is_err());
    }
}
