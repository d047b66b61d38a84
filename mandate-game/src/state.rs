//! Simulation state read by the snapshot builder and written back to by
//! post-acquisition consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::content::SupportShift;
use crate::ident;

/// Default campaign length in days.
pub const TOTAL_DAYS_DEFAULT: u32 = 8;
/// Starting treasury, in budget units.
pub const START_BUDGET: i64 = 1_000_000;
pub const START_APPROVAL: i32 = 55;
pub const START_CABINET: i32 = 60;
pub const START_STABILITY: i32 = 70;
/// Support values are percentages and stay inside this band.
pub const SUPPORT_MIN: i32 = 0;
pub const SUPPORT_MAX: i32 = 100;

/// The society the player leads for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Athens,
    NorthAmerica,
    MarsColony,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Athens => "athens",
            Self::NorthAmerica => "north_america",
            Self::MarsColony => "mars_colony",
        }
    }

    /// Two-letter prefix used in friendly run codes.
    #[must_use]
    pub const fn code_prefix(self) -> &'static str {
        match self {
            Self::Athens => "AT",
            Self::NorthAmerica => "NA",
            Self::MarsColony => "MC",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "athens" => Ok(Self::Athens),
            "north_america" => Ok(Self::NorthAmerica),
            "mars_colony" => Ok(Self::MarsColony),
            _ => Err(()),
        }
    }
}

/// The choice the player made on a previous day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub id: String,
    pub title: String,
}

/// One completed day, appended to the history after its turn resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    pub scenario_title: String,
    pub choice: ChoiceRecord,
    #[serde(default)]
    pub shift: Option<SupportShift>,
}

/// Live simulation state for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub run_code: String,
    pub role: Role,
    /// 1-based day index.
    pub day: u32,
    pub total_days: u32,
    pub budget: i64,
    pub approval: i32,
    pub cabinet: i32,
    pub stability: i32,
    /// None only on day 1.
    pub last_choice: Option<ChoiceRecord>,
    pub history: Vec<DayRecord>,
}

impl SimState {
    /// Fresh campaign for `role`, with a run code composed from `entropy`.
    #[must_use]
    pub fn new(role: Role, entropy: u64) -> Self {
        Self {
            run_code: ident::generate_run_code(role, entropy),
            role,
            day: 1,
            total_days: TOTAL_DAYS_DEFAULT,
            budget: START_BUDGET,
            approval: START_APPROVAL,
            cabinet: START_CABINET,
            stability: START_STABILITY,
            last_choice: None,
            history: Vec::new(),
        }
    }

    /// Identifier for the turn currently being acquired or presented.
    #[must_use]
    pub fn turn_id(&self) -> String {
        ident::turn_identifier(&self.run_code, self.day)
    }

    /// Apply pipeline-produced deltas to the support values.
    ///
    /// This is the narrow write-back surface: the pipeline itself never
    /// mutates state, only its consumers do, through this method.
    pub fn apply_support_shift(&mut self, shift: &SupportShift) {
        self.budget = self.budget.saturating_add(shift.budget);
        self.approval = clamp_support(self.approval + shift.approval);
        self.cabinet = clamp_support(self.cabinet + shift.cabinet);
        self.stability = clamp_support(self.stability + shift.stability);
    }

    /// Close out the current day and move to the next one.
    pub fn advance_day(&mut self, record: DayRecord) {
        self.last_choice = Some(record.choice.clone());
        self.history.push(record);
        self.day = self.day.saturating_add(1);
    }

    /// Whether the campaign has run past its final day.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.day > self.total_days
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new(Role::Athens, 0)
    }
}

fn clamp_support(value: i32) -> i32 {
    value.clamp(SUPPORT_MIN, SUPPORT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_roundtrip() {
        for role in [Role::Athens, Role::NorthAmerica, Role::MarsColony] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("venus_station".parse::<Role>().is_err());
    }

    #[test]
    fn new_state_starts_on_day_one_without_a_last_choice() {
        let state = SimState::new(Role::MarsColony, 0xC0FFEE);
        assert_eq!(state.day, 1);
        assert!(state.last_choice.is_none());
        assert!(state.history.is_empty());
        assert!(state.run_code.starts_with("MC-"));
        assert_eq!(state.turn_id(), format!("{}:1", state.run_code));
    }

    #[test]
    fn support_shift_clamps_to_percentage_band() {
        let mut state = SimState::new(Role::Athens, 1);
        state.apply_support_shift(&SupportShift {
            budget: -2_000_000,
            approval: 90,
            cabinet: -200,
            stability: -5,
            is_fallback: false,
        });
        assert_eq!(state.budget, START_BUDGET - 2_000_000);
        assert_eq!(state.approval, SUPPORT_MAX);
        assert_eq!(state.cabinet, SUPPORT_MIN);
        assert_eq!(state.stability, START_STABILITY - 5);
    }

    #[test]
    fn advance_day_records_history_and_last_choice() {
        let mut state = SimState::new(Role::NorthAmerica, 7);
        let choice = ChoiceRecord {
            id: "a".to_string(),
            title: "Impose Curfew".to_string(),
        };
        state.advance_day(DayRecord {
            day: 1,
            scenario_title: "Unrest Downtown".to_string(),
            choice: choice.clone(),
            shift: None,
        });

        assert_eq!(state.day, 2);
        assert_eq!(state.last_choice, Some(choice));
        assert_eq!(state.history.len(), 1);
        assert!(!state.finished());

        state.day = state.total_days + 1;
        assert!(state.finished());
    }
}
