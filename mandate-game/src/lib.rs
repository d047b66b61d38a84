//! Mandate Turn Pipeline
//!
//! Platform-agnostic core for the Mandate civic-leadership simulation: turns
//! several unreliable remote generation calls into a single "turn is ready"
//! signal, then replays the acquired content as a deterministic, skippable,
//! resumable reveal. No UI or platform-specific dependencies live here.

pub mod acquire;
pub mod bundle;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod ident;
pub mod progress;
pub mod readiness;
pub mod reveal;
pub mod snapshot;
pub mod state;

use async_trait::async_trait;
use serde_json::Value;

// Re-export commonly used types
pub use acquire::{
    AcquireError, GenerationError, RetryPolicy, TurnOrchestrator, PROGRESS_LAUNCHED,
    PROGRESS_PHASE_ONE, PROGRESS_PHASE_TWO, PROGRESS_READY, with_retry,
};
pub use bundle::{Conditional, TurnBundle};
pub use cache::{MemoryCacheStore, TurnCache, TurnCacheEntry, TurnCacheStore};
pub use clock::{Clock, ManualClock};
#[cfg(feature = "tokio-clock")]
pub use clock::TokioClock;
pub use config::{PipelineConfig, ProgressCfg, RetryCfg};
pub use content::{
    AdvisorBrief, AdvisorNote, ConsequenceReport, DayScenario, FallbackFlagged, RunEpilogue,
    ScenarioAnalysis, ScenarioChoice, SupportShift, TickerFeed, TickerLine,
    SCENARIO_CHOICE_COUNT,
};
pub use ident::{decode_run_code, encode_run_code, generate_run_code, turn_identifier};
pub use progress::{ProgressAnimator, ProgressPhase, pump};
pub use readiness::bundle_ready;
pub use reveal::{
    FIXED_LEADING_STEPS, FIXED_TRAILING_STEPS, RevealCheckpoint, RevealPlan, RevealRegion,
    RevealSequencer,
};
pub use snapshot::{HistoryDigest, TurnRequestSnapshot};
pub use state::{ChoiceRecord, DayRecord, Role, SimState, TOTAL_DAYS_DEFAULT};

/// Trait for abstracting the remote generation transport
/// Platform-specific implementations should provide this
///
/// One method name and a JSON payload each way; HTTP, a message queue, or an
/// in-process fake all satisfy the contract. Response shape is validated by
/// the calling adapter, never here.
#[async_trait(?Send)]
pub trait GenerationService {
    /// Execute one generation call.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the service reports one.
    async fn generate(&self, method: &str, payload: Value)
    -> Result<Value, acquire::GenerationError>;
}

/// Main pipeline facade binding a generation service, a cache store, and a
/// clock
pub struct TurnPipeline<G, S, C>
where
    G: GenerationService,
    S: TurnCacheStore,
    C: Clock,
{
    orchestrator: TurnOrchestrator<G, C>,
    cache: TurnCache<S>,
}

impl<G, S, C> TurnPipeline<G, S, C>
where
    G: GenerationService,
    S: TurnCacheStore,
    C: Clock,
{
    /// Create a pipeline with the provided service, store, and clock
    pub fn new(service: G, store: S, clock: C, config: PipelineConfig) -> Self {
        Self {
            orchestrator: TurnOrchestrator::new(service, clock, config),
            cache: TurnCache::new(store),
        }
    }

    /// Build the turn snapshot from live state and acquire its content.
    ///
    /// # Errors
    ///
    /// Returns an error only when the mandatory scenario call fails after
    /// its retries, or the bundle stays incomplete.
    pub async fn acquire_turn(
        &self,
        state: &SimState,
        progress: &mut dyn FnMut(u8),
    ) -> Result<TurnBundle, AcquireError> {
        let snapshot = TurnRequestSnapshot::from_state(state);
        self.orchestrator.acquire(&snapshot, progress).await
    }

    /// Stash a ready bundle for a return visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be serialized or persisted.
    pub fn stash_turn(&self, bundle: &TurnBundle) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let captured_at_ms = u64::try_from(self.orchestrator.clock().now().as_millis())
            .unwrap_or(u64::MAX);
        self.cache.save(bundle, captured_at_ms)
    }

    /// Restore the stashed bundle for the state's current turn, if the
    /// identifiers still match. Consumes the slot either way.
    pub fn restore_turn(&self, state: &SimState) -> Option<TurnBundle> {
        self.cache.load_and_consume(&state.turn_id())
    }

    /// Drop any stashed bundle.
    pub fn clear_stash(&self) {
        self.cache.clear();
    }

    /// Borrow the underlying generation service.
    pub fn service(&self) -> &G {
        self.orchestrator.service()
    }

    /// Borrow the pipeline clock.
    pub fn clock(&self) -> &C {
        self.orchestrator.clock()
    }

    /// End-of-run summary through the retry/fallback controller.
    ///
    /// # Errors
    ///
    /// Returns the final failure once every attempt has errored.
    pub async fn fetch_epilogue(&self, state: &SimState) -> Result<RunEpilogue, GenerationError> {
        let snapshot = TurnRequestSnapshot::from_state(state);
        self.orchestrator.epilogue(&snapshot).await
    }
}
