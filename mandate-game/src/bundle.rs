//! The accumulating turn bundle the orchestrator fills in phase by phase.

use serde::{Deserialize, Serialize};

use crate::content::{
    AdvisorBrief, ConsequenceReport, DayScenario, ScenarioAnalysis, SupportShift, TickerFeed,
};

/// Lifecycle of a conditionally-required bundle field.
///
/// `Empty` and `Ready` both count as attempted; only `NotAttempted` blocks
/// readiness on days where the field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Conditional<T> {
    #[default]
    NotAttempted,
    /// Attempted and legitimately absent (day 1, or a degraded fetch).
    Empty,
    Ready(T),
}

impl<T> Conditional<T> {
    #[must_use]
    pub const fn attempted(&self) -> bool {
        !matches!(self, Self::NotAttempted)
    }

    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Everything one turn presents, accumulated during acquisition and frozen
/// on hand-off to the presentation sequencer.
///
/// Always-required fields are `Option`s that must be populated before the
/// turn is ready; conditionally-required fields use [`Conditional`] and only
/// gate readiness after day 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnBundle {
    pub day: u32,
    pub turn_id: String,
    pub scenario: Option<DayScenario>,
    pub ticker: Option<TickerFeed>,
    pub advisory: Option<AdvisorBrief>,
    pub consequences: Conditional<ConsequenceReport>,
    pub shift: Conditional<SupportShift>,
    /// Best-effort dependent-phase output; never gates readiness.
    pub analysis: Option<ScenarioAnalysis>,
}

impl TurnBundle {
    /// Empty bundle for the given turn, everything still outstanding.
    #[must_use]
    pub fn new(day: u32, turn_id: String) -> Self {
        Self {
            day,
            turn_id,
            scenario: None,
            ticker: None,
            advisory: None,
            consequences: Conditional::NotAttempted,
            shift: Conditional::NotAttempted,
            analysis: None,
        }
    }

    /// Number of ticker lines, which drives the per-item reveal steps.
    #[must_use]
    pub fn ticker_item_count(&self) -> usize {
        self.ticker.as_ref().map_or(0, |feed| feed.lines.len())
    }

    /// Whether any populated field carries the degraded-placeholder marker.
    #[must_use]
    pub fn any_degraded(&self) -> bool {
        self.scenario.as_ref().is_some_and(|s| s.is_fallback)
            || self.ticker.as_ref().is_some_and(|t| t.is_fallback)
            || self.advisory.as_ref().is_some_and(|a| a.is_fallback)
            || self.consequences.value().is_some_and(|c| c.is_fallback)
            || self.shift.value().is_some_and(|s| s.is_fallback)
            || self.analysis.as_ref().is_some_and(|a| a.is_fallback)
    }
}
