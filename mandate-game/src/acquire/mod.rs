//! Multi-phase turn acquisition.
//!
//! Phase 1 launches every independent adapter together and suspends until
//! the whole group settles; the dependent analysis phase runs strictly
//! afterwards because its payload is derived from phase-1 output. The
//! completeness oracle is polled after each phase and can end the turn
//! early. Only the primary scenario adapter is fatal; everything else
//! degrades to a documented safe default.

pub mod adapters;
pub mod retry;

use log::{info, warn};
use thiserror::Error;

use crate::bundle::{Conditional, TurnBundle};
use crate::clock::Clock;
use crate::config::PipelineConfig;
use crate::content::{AdvisorBrief, RunEpilogue, TickerFeed};
use crate::readiness::bundle_ready;
use crate::snapshot::TurnRequestSnapshot;
use crate::GenerationService;

pub use retry::{RetryPolicy, with_retry};

/// Progress hints emitted at fixed milestones.
pub const PROGRESS_LAUNCHED: u8 = 10;
pub const PROGRESS_PHASE_ONE: u8 = 60;
pub const PROGRESS_PHASE_TWO: u8 = 85;
pub const PROGRESS_READY: u8 = 100;

/// Typed failure of one generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The transport failed before a response was produced.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response decoded but failed the adapter's shape validation.
    #[error("malformed response: {0}")]
    Shape(String),
    /// The response was not valid JSON for the expected type.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of a whole turn acquisition.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The mandatory scenario call failed after its allowed retries. The
    /// caller owns the user-facing retry affordance.
    #[error("primary scenario generation failed: {0}")]
    PrimaryContent(#[source] GenerationError),
    /// The oracle still reports not-ready after every phase settled.
    #[error("turn bundle incomplete after all phases")]
    Incomplete,
}

/// Drives adapters through the phase sequence and assembles the bundle.
pub struct TurnOrchestrator<G, C> {
    service: G,
    clock: C,
    config: PipelineConfig,
}

impl<G, C> TurnOrchestrator<G, C>
where
    G: GenerationService,
    C: Clock,
{
    pub fn new(service: G, clock: C, config: PipelineConfig) -> Self {
        Self {
            service,
            clock,
            config,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    /// Acquire everything the turn described by `snapshot` needs.
    ///
    /// `progress` receives percentage hints at the fixed milestones; the
    /// final hint is always 100, emitted exactly when the oracle first
    /// reports ready.
    ///
    /// # Errors
    ///
    /// Fails only for the mandatory scenario adapter (after retries) or if
    /// the bundle somehow stays incomplete; every other adapter failure is
    /// absorbed into its safe default.
    pub async fn acquire(
        &self,
        snapshot: &TurnRequestSnapshot,
        progress: &mut dyn FnMut(u8),
    ) -> Result<TurnBundle, AcquireError> {
        let mut bundle = TurnBundle::new(snapshot.day, snapshot.turn_identifier());
        let policy = self.config.retry.policy();

        progress(PROGRESS_LAUNCHED);
        let (scenario, ticker, advisory, consequences, shift) = futures::join!(
            with_retry(
                &self.clock,
                &policy,
                |_| adapters::fetch_scenario(&self.service, snapshot),
                |attempt, max| info!("scenario retry attempt {attempt}/{max}"),
            ),
            adapters::fetch_ticker(&self.service, snapshot),
            adapters::fetch_advisory(&self.service, snapshot),
            self.fetch_consequences_if_due(snapshot),
            self.fetch_shift_if_due(snapshot),
        );

        bundle.scenario = Some(scenario.map_err(AcquireError::PrimaryContent)?);
        bundle.ticker = Some(ticker.unwrap_or_else(|err| {
            warn!("ticker degraded to empty feed: {err}");
            TickerFeed::empty()
        }));
        bundle.advisory = Some(advisory.unwrap_or_else(|err| {
            warn!("advisory degraded to empty brief: {err}");
            AdvisorBrief::empty()
        }));
        bundle.consequences = settle_conditional("consequences", consequences);
        bundle.shift = settle_conditional("support shift", shift);
        progress(PROGRESS_PHASE_ONE);

        if bundle_ready(Some(&bundle)) && !snapshot.wants_analysis {
            progress(PROGRESS_READY);
            return Ok(bundle);
        }

        if let Some(scenario) = bundle.scenario.clone() {
            match adapters::fetch_analysis(&self.service, snapshot, &scenario).await {
                Ok(analysis) => bundle.analysis = Some(analysis),
                Err(err) => warn!("analysis degraded to none: {err}"),
            }
        }
        progress(PROGRESS_PHASE_TWO);

        if bundle_ready(Some(&bundle)) {
            progress(PROGRESS_READY);
            Ok(bundle)
        } else {
            Err(AcquireError::Incomplete)
        }
    }

    /// Whole-run epilogue through the same retry/fallback controller the
    /// scenario call uses. A degraded epilogue on the final attempt is
    /// returned, flag intact.
    ///
    /// # Errors
    ///
    /// Returns the last transport or shape failure once attempts run out.
    pub async fn epilogue(
        &self,
        snapshot: &TurnRequestSnapshot,
    ) -> Result<RunEpilogue, GenerationError> {
        let policy = self.config.retry.policy();
        with_retry(
            &self.clock,
            &policy,
            |_| adapters::fetch_epilogue(&self.service, snapshot),
            |attempt, max| info!("epilogue retry attempt {attempt}/{max}"),
        )
        .await
    }

    async fn fetch_consequences_if_due(
        &self,
        snapshot: &TurnRequestSnapshot,
    ) -> Option<Result<crate::content::ConsequenceReport, GenerationError>> {
        snapshot.last_choice.as_ref()?;
        Some(adapters::fetch_consequences(&self.service, snapshot).await)
    }

    async fn fetch_shift_if_due(
        &self,
        snapshot: &TurnRequestSnapshot,
    ) -> Option<Result<crate::content::SupportShift, GenerationError>> {
        snapshot.last_choice.as_ref()?;
        Some(adapters::fetch_shift(&self.service, snapshot).await)
    }
}

/// Collapse a conditional fetch outcome into the tri-state field: skipped
/// turns are attempted-and-empty, failures degrade the same way.
fn settle_conditional<T>(
    label: &str,
    outcome: Option<Result<T, GenerationError>>,
) -> Conditional<T> {
    match outcome {
        None => Conditional::Empty,
        Some(Ok(value)) => Conditional::Ready(value),
        Some(Err(err)) => {
            warn!("{label} degraded to empty: {err}");
            Conditional::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::content::SCENARIO_CHOICE_COUNT;
    use crate::state::{ChoiceRecord, Role, SimState};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted service: canned response per method, with a call log.
    #[derive(Default)]
    struct FixtureService {
        responses: HashMap<&'static str, Value>,
        failures: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FixtureService {
        fn with_defaults() -> Self {
            let mut service = Self::default();
            service.responses.insert(
                adapters::METHOD_SCENARIO,
                json!({
                    "title": "Harbor Blockade",
                    "body": "Rival ships anchor across the harbor mouth.",
                    "choices": (0..SCENARIO_CHOICE_COUNT).map(|i| json!({
                        "id": format!("c{i}"),
                        "label": format!("Option {i}"),
                    })).collect::<Vec<_>>(),
                    "is_fallback": false,
                }),
            );
            service.responses.insert(
                adapters::METHOD_TICKER,
                json!({
                    "lines": [{"source": "Agora Herald", "text": "Blockade tightens."}],
                    "is_fallback": false,
                }),
            );
            service.responses.insert(
                adapters::METHOD_ADVISORY,
                json!({
                    "notes": [{"advisor": "Strategos", "text": "Do not provoke them."}],
                    "is_fallback": false,
                }),
            );
            service.responses.insert(
                adapters::METHOD_CONSEQUENCES,
                json!({
                    "summary": "The curfew calmed the streets.",
                    "detail": "",
                    "is_fallback": false,
                }),
            );
            service.responses.insert(
                adapters::METHOD_SHIFT,
                json!({"budget": -500, "approval": -3, "cabinet": 1, "stability": 2, "is_fallback": false}),
            );
            service.responses.insert(
                adapters::METHOD_ANALYSIS,
                json!({
                    "assessment": "The blockade is a bargaining posture.",
                    "risks": ["escalation at sea"],
                    "is_fallback": false,
                }),
            );
            service.responses.insert(
                adapters::METHOD_EPILOGUE,
                json!({
                    "headline": "A Fragile Peace",
                    "epilogue": "The city endures, wary but standing.",
                    "is_fallback": false,
                }),
            );
            service
        }

        fn fail(mut self, method: &'static str) -> Self {
            self.failures.push(method);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl GenerationService for FixtureService {
        async fn generate(&self, method: &str, _payload: Value) -> Result<Value, GenerationError> {
            self.calls.borrow_mut().push(method.to_string());
            if self.failures.contains(&method) {
                return Err(GenerationError::Transport(format!("{method} unavailable")));
            }
            self.responses
                .get(method)
                .cloned()
                .ok_or_else(|| GenerationError::Transport(format!("no fixture for {method}")))
        }
    }

    fn orchestrator(service: FixtureService) -> TurnOrchestrator<FixtureService, ManualClock> {
        TurnOrchestrator::new(service, ManualClock::new(), PipelineConfig::default())
    }

    fn day_two_snapshot() -> TurnRequestSnapshot {
        let mut state = SimState::new(Role::Athens, 42);
        state.day = 2;
        state.last_choice = Some(ChoiceRecord {
            id: "a".to_string(),
            title: "Impose Curfew".to_string(),
        });
        TurnRequestSnapshot::from_state(&state)
    }

    #[test]
    fn day_one_skips_conditional_adapters_and_is_ready() {
        let orchestrator = orchestrator(FixtureService::with_defaults());
        let snapshot = TurnRequestSnapshot::from_state(&SimState::new(Role::Athens, 42));
        let mut milestones = Vec::new();

        let bundle =
            block_on(orchestrator.acquire(&snapshot, &mut |p| milestones.push(p))).unwrap();

        assert!(bundle_ready(Some(&bundle)));
        assert_eq!(bundle.consequences, Conditional::Empty);
        assert_eq!(bundle.shift, Conditional::Empty);
        let calls = orchestrator.service.calls();
        assert!(!calls.iter().any(|m| m == adapters::METHOD_CONSEQUENCES));
        assert!(!calls.iter().any(|m| m == adapters::METHOD_SHIFT));
        // Low-pressure day 1 wants no analysis: the turn stops after phase 1.
        assert!(!calls.iter().any(|m| m == adapters::METHOD_ANALYSIS));
        assert_eq!(
            milestones,
            vec![PROGRESS_LAUNCHED, PROGRESS_PHASE_ONE, PROGRESS_READY]
        );
    }

    #[test]
    fn later_days_invoke_all_five_adapters_before_ready() {
        let orchestrator = orchestrator(FixtureService::with_defaults());
        let snapshot = day_two_snapshot();
        let mut milestones = Vec::new();

        let bundle =
            block_on(orchestrator.acquire(&snapshot, &mut |p| milestones.push(p))).unwrap();

        assert!(bundle_ready(Some(&bundle)));
        assert!(bundle.consequences.value().is_some());
        assert!(bundle.shift.value().is_some());
        let calls = orchestrator.service.calls();
        for method in [
            adapters::METHOD_SCENARIO,
            adapters::METHOD_TICKER,
            adapters::METHOD_ADVISORY,
            adapters::METHOD_CONSEQUENCES,
            adapters::METHOD_SHIFT,
        ] {
            assert!(calls.iter().any(|m| m == method), "missing call: {method}");
        }
    }

    #[test]
    fn analysis_runs_when_the_snapshot_wants_it() {
        let orchestrator = orchestrator(FixtureService::with_defaults());
        let mut state = SimState::new(Role::MarsColony, 42);
        state.stability = 20; // high pressure
        let snapshot = TurnRequestSnapshot::from_state(&state);
        assert!(snapshot.wants_analysis);
        let mut milestones = Vec::new();

        let bundle =
            block_on(orchestrator.acquire(&snapshot, &mut |p| milestones.push(p))).unwrap();

        assert!(bundle.analysis.is_some());
        assert_eq!(
            milestones,
            vec![
                PROGRESS_LAUNCHED,
                PROGRESS_PHASE_ONE,
                PROGRESS_PHASE_TWO,
                PROGRESS_READY
            ]
        );
    }

    #[test]
    fn mandatory_scenario_failure_is_fatal_after_retries() {
        let service = FixtureService::with_defaults().fail(adapters::METHOD_SCENARIO);
        let orchestrator = orchestrator(service);
        let snapshot = TurnRequestSnapshot::from_state(&SimState::new(Role::Athens, 42));

        let err = block_on(orchestrator.acquire(&snapshot, &mut |_| {})).unwrap_err();
        assert!(matches!(err, AcquireError::PrimaryContent(_)));
        let scenario_calls = orchestrator
            .service
            .calls()
            .iter()
            .filter(|m| *m == adapters::METHOD_SCENARIO)
            .count();
        assert_eq!(scenario_calls, 5);
    }

    #[test]
    fn non_mandatory_failures_degrade_to_safe_defaults() {
        let service = FixtureService::with_defaults()
            .fail(adapters::METHOD_TICKER)
            .fail(adapters::METHOD_ADVISORY)
            .fail(adapters::METHOD_CONSEQUENCES)
            .fail(adapters::METHOD_SHIFT);
        let orchestrator = orchestrator(service);
        let snapshot = day_two_snapshot();

        let bundle = block_on(orchestrator.acquire(&snapshot, &mut |_| {})).unwrap();

        assert!(bundle_ready(Some(&bundle)));
        assert_eq!(bundle.ticker, Some(TickerFeed::empty()));
        assert_eq!(bundle.advisory, Some(AdvisorBrief::empty()));
        assert_eq!(bundle.consequences, Conditional::Empty);
        assert_eq!(bundle.shift, Conditional::Empty);
    }

    #[test]
    fn epilogue_goes_through_the_retry_controller() {
        let service = FixtureService::with_defaults().fail(adapters::METHOD_EPILOGUE);
        let orchestrator = orchestrator(service);
        let snapshot = TurnRequestSnapshot::from_state(&SimState::new(Role::Athens, 42));

        let err = block_on(orchestrator.epilogue(&snapshot)).unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        let calls = orchestrator
            .service
            .calls()
            .iter()
            .filter(|m| *m == adapters::METHOD_EPILOGUE)
            .count();
        assert_eq!(calls, 5);

        let clean = orchestrator_with_clean_epilogue();
        let epilogue = block_on(clean.epilogue(&snapshot)).unwrap();
        assert_eq!(epilogue.headline, "A Fragile Peace");
    }

    fn orchestrator_with_clean_epilogue() -> TurnOrchestrator<FixtureService, ManualClock> {
        orchestrator(FixtureService::with_defaults())
    }
}
