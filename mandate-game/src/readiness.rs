//! The completeness oracle: the single answer to "can this turn be shown".
//!
//! Pure predicate, callable any number of times. The orchestrator polls it
//! after every phase, consumers gate presentation on it, and tests assert
//! against the same implementation; nothing else may re-derive readiness.

use crate::bundle::TurnBundle;
use crate::content::DayScenario;

/// Whether the bundle holds everything its day requires.
///
/// Absent bundle, or any always-required field missing or shape-invalid,
/// means not ready. After day 1 the conditional fields must additionally
/// have been attempted (present or legitimately empty, never outstanding).
#[must_use]
pub fn bundle_ready(bundle: Option<&TurnBundle>) -> bool {
    let Some(bundle) = bundle else {
        return false;
    };
    if !bundle.scenario.as_ref().is_some_and(DayScenario::shape_valid) {
        return false;
    }
    if bundle.ticker.is_none() || bundle.advisory.is_none() {
        return false;
    }
    if bundle.day > 1 && !(bundle.consequences.attempted() && bundle.shift.attempted()) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Conditional;
    use crate::content::{
        AdvisorBrief, ConsequenceReport, DayScenario, ScenarioChoice, SupportShift, TickerFeed,
        SCENARIO_CHOICE_COUNT,
    };

    fn scenario() -> DayScenario {
        DayScenario {
            title: "Assembly Vote".to_string(),
            body: "The assembly demands an answer on the grain tariff.".to_string(),
            choices: (0..SCENARIO_CHOICE_COUNT)
                .map(|i| ScenarioChoice {
                    id: format!("c{i}"),
                    label: format!("Option {i}"),
                })
                .collect(),
            is_fallback: false,
        }
    }

    fn populated(day: u32) -> TurnBundle {
        let mut bundle = TurnBundle::new(day, format!("AT-AGORA42:{day}"));
        bundle.scenario = Some(scenario());
        bundle.ticker = Some(TickerFeed::empty());
        bundle.advisory = Some(AdvisorBrief::empty());
        bundle
    }

    #[test]
    fn absent_bundle_is_never_ready() {
        assert!(!bundle_ready(None));
    }

    #[test]
    fn day_one_ignores_conditional_fields() {
        let bundle = populated(1);
        assert!(!bundle.consequences.attempted());
        assert!(bundle_ready(Some(&bundle)));
    }

    #[test]
    fn missing_always_required_fields_block_readiness() {
        let mut bundle = populated(1);
        bundle.ticker = None;
        assert!(!bundle_ready(Some(&bundle)));

        let mut bundle = populated(1);
        bundle.advisory = None;
        assert!(!bundle_ready(Some(&bundle)));

        let mut bundle = populated(1);
        bundle.scenario = None;
        assert!(!bundle_ready(Some(&bundle)));
    }

    #[test]
    fn malformed_scenario_blocks_readiness() {
        let mut bundle = populated(1);
        if let Some(scenario) = bundle.scenario.as_mut() {
            scenario.choices.pop();
        }
        assert!(!bundle_ready(Some(&bundle)));

        let mut bundle = populated(1);
        if let Some(scenario) = bundle.scenario.as_mut() {
            scenario.title = String::new();
        }
        assert!(!bundle_ready(Some(&bundle)));
    }

    #[test]
    fn later_days_wait_for_both_conditional_fields() {
        let mut bundle = populated(2);
        assert!(!bundle_ready(Some(&bundle)));

        bundle.consequences = Conditional::Ready(ConsequenceReport {
            summary: "The curfew held.".to_string(),
            detail: String::new(),
            is_fallback: false,
        });
        assert!(!bundle_ready(Some(&bundle)));

        bundle.shift = Conditional::Empty;
        assert!(bundle_ready(Some(&bundle)));
    }

    #[test]
    fn attempted_and_empty_is_enough_after_day_one() {
        let mut bundle = populated(5);
        bundle.consequences = Conditional::Empty;
        bundle.shift = Conditional::Ready(SupportShift::default());
        assert!(bundle_ready(Some(&bundle)));
    }
}
