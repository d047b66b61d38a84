//! Generated turn content and per-capability shape validation.
//!
//! Every response type carries a required `is_fallback` marker set by the
//! generation service when it substituted a canned placeholder for real
//! content. Fallback-ness is only ever read through [`FallbackFlagged`];
//! nothing in the pipeline infers it from the content itself.

use serde::{Deserialize, Serialize};

/// Number of choices a scenario must offer. Any other count is a validation
/// failure, not a partial success.
pub const SCENARIO_CHOICE_COUNT: usize = 3;

/// Degraded-placeholder marker shared by every retryable response type.
pub trait FallbackFlagged {
    fn is_fallback(&self) -> bool;
}

/// One selectable option within a day scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioChoice {
    pub id: String,
    pub label: String,
}

/// The day's crisis scenario - the one piece of content the turn cannot be
/// presented without.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScenario {
    pub title: String,
    pub body: String,
    pub choices: Vec<ScenarioChoice>,
    pub is_fallback: bool,
}

impl DayScenario {
    /// Minimal acceptable shape: non-empty title and body, exactly
    /// [`SCENARIO_CHOICE_COUNT`] choices, each with an id and a label.
    #[must_use]
    pub fn shape_valid(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.body.trim().is_empty()
            && self.choices.len() == SCENARIO_CHOICE_COUNT
            && self
                .choices
                .iter()
                .all(|c| !c.id.trim().is_empty() && !c.label.trim().is_empty())
    }
}

/// One line of the rolling news ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerLine {
    pub source: String,
    pub text: String,
}

/// News ticker commentary on the day's events. Legitimately empty on quiet
/// days; the empty feed is also the safe default when the adapter fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TickerFeed {
    pub lines: Vec<TickerLine>,
    #[serde(default)]
    pub is_fallback: bool,
}

impl TickerFeed {
    /// Empty feed (safe default and test fixture).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single advisor's note on the current situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorNote {
    pub advisor: String,
    pub text: String,
}

/// Advisor commentary accompanying the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdvisorBrief {
    pub notes: Vec<AdvisorNote>,
    #[serde(default)]
    pub is_fallback: bool,
}

impl AdvisorBrief {
    /// Empty brief (safe default and test fixture).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Narrative fallout of the previous day's choice. Only requested when a
/// previous choice exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsequenceReport {
    pub summary: String,
    #[serde(default)]
    pub detail: String,
    pub is_fallback: bool,
}

impl ConsequenceReport {
    #[must_use]
    pub fn shape_valid(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}

/// Numeric deltas attributed to the previous day's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SupportShift {
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub approval: i32,
    #[serde(default)]
    pub cabinet: i32,
    #[serde(default)]
    pub stability: i32,
    #[serde(default)]
    pub is_fallback: bool,
}

/// Deep analysis of the day's scenario, produced in the dependent phase from
/// the scenario text. Best effort; never gates readiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub assessment: String,
    #[serde(default)]
    pub risks: Vec<String>,
    pub is_fallback: bool,
}

impl ScenarioAnalysis {
    #[must_use]
    pub fn shape_valid(&self) -> bool {
        !self.assessment.trim().is_empty()
    }
}

/// Whole-run summary generated once the campaign ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEpilogue {
    pub headline: String,
    pub epilogue: String,
    pub is_fallback: bool,
}

impl RunEpilogue {
    #[must_use]
    pub fn shape_valid(&self) -> bool {
        !self.headline.trim().is_empty() && !self.epilogue.trim().is_empty()
    }
}

impl FallbackFlagged for DayScenario {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl FallbackFlagged for TickerFeed {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl FallbackFlagged for AdvisorBrief {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl FallbackFlagged for ConsequenceReport {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl FallbackFlagged for SupportShift {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl FallbackFlagged for ScenarioAnalysis {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl FallbackFlagged for RunEpilogue {
    fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}
