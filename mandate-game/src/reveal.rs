//! Step-by-step reveal of an acquired turn.
//!
//! A turn is replayed as a monotonically increasing step counter with named
//! checkpoints; each UI region reports completion and the sequencer moves
//! on. Ticker lines are revealed one step each, so the terminal step is
//! recomputed per turn from the feed length, never hard-coded.

use serde::{Deserialize, Serialize};

use crate::bundle::TurnBundle;

/// Steps before the variable ticker items: intro, scenario.
pub const FIXED_LEADING_STEPS: u32 = 2;
/// Steps after the ticker items: advisory summary, terminal choices.
pub const FIXED_TRAILING_STEPS: u32 = 2;

/// Named checkpoint a step maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealCheckpoint {
    /// Nothing revealed yet.
    Start,
    Intro,
    Scenario,
    /// Zero-based ticker line index.
    TickerItem(usize),
    Advisory,
    /// Everything visible, choices interactive.
    Terminal,
}

/// UI region the current checkpoint should scroll into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealRegion {
    Intro,
    Scenario,
    Ticker,
    Advisory,
    Choices,
}

/// Step-to-checkpoint map for one turn's bundle shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealPlan {
    item_count: usize,
}

impl RevealPlan {
    #[must_use]
    pub const fn new(item_count: usize) -> Self {
        Self { item_count }
    }

    /// Plan sized for a ready bundle's ticker feed.
    #[must_use]
    pub fn for_bundle(bundle: &TurnBundle) -> Self {
        Self::new(bundle.ticker_item_count())
    }

    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Last step of the sequence: leading + items + trailing.
    #[must_use]
    pub const fn terminal_step(&self) -> u32 {
        FIXED_LEADING_STEPS + self.item_count as u32 + FIXED_TRAILING_STEPS
    }

    /// Checkpoint revealed at `step`; steps past the end clamp to terminal.
    #[must_use]
    pub fn checkpoint_at(&self, step: u32) -> RevealCheckpoint {
        let items = self.item_count as u32;
        match step {
            0 => RevealCheckpoint::Start,
            1 => RevealCheckpoint::Intro,
            2 => RevealCheckpoint::Scenario,
            s if s <= FIXED_LEADING_STEPS + items => {
                RevealCheckpoint::TickerItem((s - FIXED_LEADING_STEPS - 1) as usize)
            }
            s if s == FIXED_LEADING_STEPS + items + 1 => RevealCheckpoint::Advisory,
            _ => RevealCheckpoint::Terminal,
        }
    }
}

/// State machine driving the reveal; `advance_to_next` and `skip_to_end`
/// are the only mutators short of a full reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSequencer {
    plan: RevealPlan,
    step: u32,
    skipped: bool,
}

impl RevealSequencer {
    /// Fresh reveal: start before the first checkpoint and animate through.
    #[must_use]
    pub const fn fresh(plan: RevealPlan) -> Self {
        Self {
            plan,
            step: 0,
            skipped: false,
        }
    }

    /// Return visit: everything already seen, start at the terminal step.
    #[must_use]
    pub const fn resumed(plan: RevealPlan) -> Self {
        Self {
            plan,
            step: plan.terminal_step(),
            skipped: false,
        }
    }

    /// A region finished revealing; move to the next step.
    ///
    /// Saturates at the terminal step: the counter never decreases and
    /// never overshoots.
    pub fn advance_to_next(&mut self) -> u32 {
        self.step = (self.step + 1).min(self.plan.terminal_step());
        self.step
    }

    /// Jump straight to the terminal step; per-step timers must not fire
    /// afterwards.
    pub fn skip_to_end(&mut self) {
        self.step = self.plan.terminal_step();
        self.skipped = true;
    }

    /// Full reset for a new turn; the only way the counter goes backwards.
    pub fn reset(&mut self, plan: RevealPlan) {
        self.plan = plan;
        self.step = 0;
        self.skipped = false;
    }

    #[must_use]
    pub const fn step(&self) -> u32 {
        self.step
    }

    #[must_use]
    pub const fn plan(&self) -> RevealPlan {
        self.plan
    }

    #[must_use]
    pub fn checkpoint(&self) -> RevealCheckpoint {
        self.plan.checkpoint_at(self.step)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.step >= self.plan.terminal_step()
    }

    #[must_use]
    pub const fn was_skipped(&self) -> bool {
        self.skipped
    }

    /// Whether the skip affordance should still be offered.
    #[must_use]
    pub fn skip_available(&self) -> bool {
        !self.skipped && !self.is_terminal()
    }

    /// Region to scroll into view for the current step.
    #[must_use]
    pub fn scroll_target(&self) -> Option<RevealRegion> {
        match self.checkpoint() {
            RevealCheckpoint::Start => None,
            RevealCheckpoint::Intro => Some(RevealRegion::Intro),
            RevealCheckpoint::Scenario => Some(RevealRegion::Scenario),
            RevealCheckpoint::TickerItem(_) => Some(RevealRegion::Ticker),
            RevealCheckpoint::Advisory => Some(RevealRegion::Advisory),
            RevealCheckpoint::Terminal => Some(RevealRegion::Choices),
        }
    }
}
