//! Immutable request snapshot handed to every generation adapter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ident;
use crate::state::{ChoiceRecord, Role, SimState};

/// How many trailing days feed the support-trend hint.
pub const TREND_WINDOW: usize = 3;
/// Pressure level at which the dependent analysis phase becomes worth
/// requesting.
pub const ANALYSIS_PRESSURE_FLOOR: u8 = 60;

/// Compact per-day history entry shipped to the services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDigest {
    pub day: u32,
    pub scenario_title: String,
    pub choice_title: String,
}

/// Everything a generation service needs to know about the current turn.
///
/// Built once per turn from [`SimState`] and never mutated afterwards; every
/// adapter serializes the same snapshot into its request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRequestSnapshot {
    pub run_code: String,
    pub role: Role,
    pub day: u32,
    pub total_days: u32,
    pub budget: i64,
    pub approval: i32,
    pub cabinet: i32,
    pub stability: i32,
    /// None only on day 1.
    pub last_choice: Option<ChoiceRecord>,
    pub history: Vec<HistoryDigest>,
    /// Net approval movement over the trailing window.
    pub support_trend: i32,
    /// 0-100, driven by the weakest support value.
    pub pressure: u8,
    /// Derived hint: whether the dependent analysis phase is wanted at all.
    pub wants_analysis: bool,
}

impl TurnRequestSnapshot {
    /// Snapshot builder: pure read of the live state.
    #[must_use]
    pub fn from_state(state: &SimState) -> Self {
        let history: Vec<HistoryDigest> = state
            .history
            .iter()
            .map(|record| HistoryDigest {
                day: record.day,
                scenario_title: record.scenario_title.clone(),
                choice_title: record.choice.title.clone(),
            })
            .collect();
        let support_trend = support_trend(state);
        let pressure = pressure(state);
        let wants_analysis = state.day >= state.total_days || pressure >= ANALYSIS_PRESSURE_FLOOR;

        Self {
            run_code: state.run_code.clone(),
            role: state.role,
            day: state.day,
            total_days: state.total_days,
            budget: state.budget,
            approval: state.approval,
            cabinet: state.cabinet,
            stability: state.stability,
            last_choice: state.last_choice.clone(),
            history,
            support_trend,
            pressure,
            wants_analysis,
        }
    }

    /// Identifier of the turn this snapshot requests content for.
    #[must_use]
    pub fn turn_identifier(&self) -> String {
        ident::turn_identifier(&self.run_code, self.day)
    }

    /// The JSON payload shared by every adapter request.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be represented as JSON.
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn support_trend(state: &SimState) -> i32 {
    state
        .history
        .iter()
        .rev()
        .take(TREND_WINDOW)
        .filter_map(|record| record.shift.as_ref())
        .map(|shift| shift.approval)
        .sum()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pressure(state: &SimState) -> u8 {
    let weakest = state
        .approval
        .min(state.cabinet)
        .min(state.stability)
        .clamp(0, 100);
    (100 - weakest) as u8
}
