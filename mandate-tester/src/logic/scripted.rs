//! Deterministic in-process generation service with failure injection.
//!
//! Satisfies the pipeline's opaque RPC contract from canned phrase banks, so
//! full campaigns run without any network. A seeded RNG drives both the
//! content variety and the injected failures, making every run replayable
//! from its seed.

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde_json::{Value, json};
use std::cell::RefCell;

use mandate_game::{GenerationError, GenerationService, SCENARIO_CHOICE_COUNT};

const SCENARIO_TITLES: [&str; 6] = [
    "Emergency Session",
    "Grain Ledger Crisis",
    "Power Rationing Vote",
    "Border Incident",
    "Strike at the Works",
    "Flood in the Lower Wards",
];

const CHOICE_LABELS: [&str; 9] = [
    "Impose Curfew",
    "Open the Granaries",
    "Call for Calm",
    "Raise the Levy",
    "Dispatch Envoys",
    "Ration Supplies",
    "Address the Assembly",
    "Deploy the Guard",
    "Offer Amnesty",
];

const TICKER_SOURCES: [&str; 4] = ["Wire", "Herald", "Watch", "Relay"];

const ADVISORS: [&str; 4] = ["Treasurer", "Strategos", "Quartermaster", "Chronicler"];

/// Injection knobs for one scripted run.
#[derive(Debug, Clone, Copy)]
pub struct InjectionProfile {
    /// Probability that any single call fails with a transport error.
    pub fail_rate: f64,
    /// Number of leading scenario responses flagged as fallback content.
    pub fallback_streak: u32,
}

impl Default for InjectionProfile {
    fn default() -> Self {
        Self {
            fail_rate: 0.0,
            fallback_streak: 0,
        }
    }
}

/// Scripted generation service: one instance per campaign run.
pub struct ScriptedService {
    rng: RefCell<ChaCha20Rng>,
    profile: InjectionProfile,
    scenario_served: RefCell<u32>,
    calls: RefCell<u32>,
}

impl ScriptedService {
    #[must_use]
    pub fn new(seed: u64, profile: InjectionProfile) -> Self {
        Self {
            rng: RefCell::new(ChaCha20Rng::seed_from_u64(seed)),
            profile,
            scenario_served: RefCell::new(0),
            calls: RefCell::new(0),
        }
    }

    /// Total calls answered or failed so far.
    #[must_use]
    pub fn call_count(&self) -> u32 {
        *self.calls.borrow()
    }

    fn inject_failure(&self, method: &str) -> Result<(), GenerationError> {
        // The mandatory scenario call stays subject to injection too; its
        // retries are exactly what the harness wants to exercise.
        let roll: f64 = self.rng.borrow_mut().r#gen();
        if roll < self.profile.fail_rate {
            return Err(GenerationError::Transport(format!(
                "injected outage for {method}"
            )));
        }
        Ok(())
    }

    fn pick<'a>(&self, options: &[&'a str]) -> &'a str {
        let idx = self.rng.borrow_mut().gen_range(0..options.len());
        options[idx]
    }

    fn scenario(&self, payload: &Value) -> Value {
        let served = {
            let mut served = self.scenario_served.borrow_mut();
            *served += 1;
            *served
        };
        let is_fallback = served <= self.profile.fallback_streak;
        let day = payload["day"].as_u64().unwrap_or(1);
        let role = payload["role"].as_str().unwrap_or("athens");
        let title = if is_fallback {
            "Standby Briefing".to_string()
        } else {
            format!("Day {day}: {}", self.pick(&SCENARIO_TITLES))
        };
        let mut labels = Vec::with_capacity(SCENARIO_CHOICE_COUNT);
        while labels.len() < SCENARIO_CHOICE_COUNT {
            let label = self.pick(&CHOICE_LABELS);
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        let choices: Vec<Value> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| json!({"id": format!("c{i}"), "label": label}))
            .collect();
        json!({
            "title": title,
            "body": format!("The {role} administration faces a hard morning."),
            "choices": choices,
            "is_fallback": is_fallback,
        })
    }

    fn ticker(&self) -> Value {
        let count = self.rng.borrow_mut().gen_range(0..5usize);
        let lines: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "source": self.pick(&TICKER_SOURCES),
                    "text": format!("Bulletin {i}: crowds gather near the market."),
                })
            })
            .collect();
        json!({"lines": lines, "is_fallback": false})
    }

    fn advisory(&self) -> Value {
        json!({
            "notes": [{
                "advisor": self.pick(&ADVISORS),
                "text": "Hold the line today and spend tomorrow.",
            }],
            "is_fallback": false,
        })
    }

    fn consequences(&self, payload: &Value) -> Value {
        let choice = payload["last_choice"]["title"].as_str().unwrap_or("the decision");
        json!({
            "summary": format!("\"{choice}\" dominated the morning reports."),
            "detail": "Reactions split along the usual lines.",
            "is_fallback": false,
        })
    }

    fn support_shift(&self) -> Value {
        let mut rng = self.rng.borrow_mut();
        json!({
            "budget": rng.gen_range(-5_000i64..1_000),
            "approval": rng.gen_range(-6i32..6),
            "cabinet": rng.gen_range(-4i32..4),
            "stability": rng.gen_range(-5i32..5),
            "is_fallback": false,
        })
    }

    fn analysis(&self, payload: &Value) -> Value {
        let title = payload["scenario_title"].as_str().unwrap_or("the scenario");
        json!({
            "assessment": format!("{title} is containable if supplies hold."),
            "risks": ["supply exhaustion", "cabinet defection"],
            "is_fallback": false,
        })
    }

    fn epilogue(&self, payload: &Value) -> Value {
        let days = payload["history"].as_array().map_or(0, Vec::len);
        json!({
            "headline": "The Ledger of Eight Days",
            "epilogue": format!("After {days} recorded days, the administration endures."),
            "is_fallback": false,
        })
    }
}

#[async_trait(?Send)]
impl GenerationService for ScriptedService {
    async fn generate(&self, method: &str, payload: Value) -> Result<Value, GenerationError> {
        *self.calls.borrow_mut() += 1;
        self.inject_failure(method)?;
        let value = match method {
            "turn.scenario" => self.scenario(&payload),
            "turn.ticker" => self.ticker(),
            "turn.advisory" => self.advisory(),
            "turn.consequences" => self.consequences(&payload),
            "turn.support_shift" => self.support_shift(),
            "turn.analysis" => self.analysis(&payload),
            "run.epilogue" => self.epilogue(&payload),
            other => {
                return Err(GenerationError::Transport(format!(
                    "scripted service has no handler for {other}"
                )));
            }
        };
        Ok(value)
    }
}
