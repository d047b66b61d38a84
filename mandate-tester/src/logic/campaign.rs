//! Drives full campaigns through the real pipeline against the scripted
//! service and records what happened each day.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use mandate_game::{
    ChoiceRecord, Clock, DayRecord, MemoryCacheStore, PipelineConfig, ProgressAnimator,
    ProgressCfg, RetryCfg, RevealPlan, RevealSequencer, SimState, TurnPipeline, bundle_ready,
    pump,
};

use super::scripted::{InjectionProfile, ScriptedService};

/// Progress-bar pacing for harness runs; fast enough that a full campaign
/// with injected retries finishes in well under a second of timer time.
const HARNESS_PROGRESS: ProgressCfg = ProgressCfg {
    tick_ms: 20,
    creep_step: 1,
    creep_cap: 99,
    catch_up_ms: 40,
};
const HARNESS_FRAME_MS: u64 = 5;
/// Chance per day that the simulated player smashes the skip button.
const SKIP_CHANCE: f64 = 0.25;

/// One campaign run's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub role: mandate_game::Role,
    pub seed: u64,
    pub days: u32,
    pub fail_rate: f64,
    pub fallback_streak: u32,
    pub base_delay_ms: u64,
    pub verbose: bool,
}

/// What one day of the campaign looked like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub day: u32,
    pub milestones: Vec<u8>,
    pub degraded: bool,
    pub ticker_items: usize,
    pub reveal_steps: u32,
    pub skipped: bool,
    pub final_progress: u8,
    pub restored_from_cache: bool,
}

/// Outcome of a whole campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub role: mandate_game::Role,
    pub seed: u64,
    pub days: Vec<DayReport>,
    pub epilogue_headline: Option<String>,
    pub failures: Vec<String>,
    pub service_calls: u32,
}

impl CampaignReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run one full campaign. Every remote call, retry wait, and progress frame
/// happens in-process on the pipeline's clock.
pub async fn run_campaign<C: Clock>(cfg: &CampaignConfig, clock: C) -> CampaignReport {
    let service = ScriptedService::new(
        cfg.seed,
        InjectionProfile {
            fail_rate: cfg.fail_rate,
            fallback_streak: cfg.fallback_streak,
        },
    );
    let pipeline_cfg = PipelineConfig {
        retry: RetryCfg {
            base_delay_ms: cfg.base_delay_ms,
            ..RetryCfg::default()
        },
        progress: HARNESS_PROGRESS,
    };
    let pipeline = TurnPipeline::new(service, MemoryCacheStore::new(), clock, pipeline_cfg);
    let mut driver_rng = ChaCha20Rng::seed_from_u64(cfg.seed ^ 0x5EED_DA7A);

    let mut state = SimState::new(cfg.role, cfg.seed);
    state.total_days = cfg.days;
    let mut report = CampaignReport {
        role: cfg.role,
        seed: cfg.seed,
        days: Vec::new(),
        epilogue_headline: None,
        failures: Vec::new(),
        service_calls: 0,
    };

    for day in 1..=cfg.days {
        match run_day(&pipeline, &mut state, &mut driver_rng, cfg.verbose).await {
            Ok(day_report) => {
                debug!("day {day} acquired in {} milestones", day_report.milestones.len());
                report.days.push(day_report);
            }
            Err(failure) => {
                report.failures.push(format!("day {day}: {failure}"));
                break;
            }
        }
    }

    if report.failures.is_empty() && state.finished() {
        match pipeline.fetch_epilogue(&state).await {
            Ok(epilogue) => report.epilogue_headline = Some(epilogue.headline),
            Err(err) => report.failures.push(format!("epilogue: {err}")),
        }
    }

    report.service_calls = pipeline.service().call_count();
    report
}

async fn run_day<C: Clock>(
    pipeline: &TurnPipeline<ScriptedService, MemoryCacheStore, C>,
    state: &mut SimState,
    driver_rng: &mut ChaCha20Rng,
    verbose: bool,
) -> Result<DayReport, String> {
    let mut milestones = Vec::new();
    let animator = RefCell::new(ProgressAnimator::new(HARNESS_PROGRESS));
    animator.borrow_mut().start();

    let frames = RefCell::new(Vec::new());
    let (acquired, ()) = futures::join!(
        async {
            let outcome = pipeline
                .acquire_turn(state, &mut |p| milestones.push(p))
                .await;
            animator.borrow_mut().notify_ready();
            outcome
        },
        pump(
            pipeline.clock(),
            &animator,
            Duration::from_millis(HARNESS_FRAME_MS),
            |v| frames.borrow_mut().push(v),
        ),
    );
    let bundle = acquired.map_err(|err| err.to_string())?;
    let final_progress = frames.borrow().last().copied().unwrap_or(0);

    if !bundle_ready(Some(&bundle)) {
        return Err("oracle rejected an acquired bundle".to_string());
    }
    if final_progress != 100 {
        return Err(format!("progress bar stopped at {final_progress}"));
    }

    // Exercise the stash/restore path the way a screen navigation would.
    pipeline
        .stash_turn(&bundle)
        .map_err(|err| format!("stash failed: {err}"))?;
    let restored = pipeline
        .restore_turn(state)
        .ok_or_else(|| "stashed turn did not restore".to_string())?;
    let restored_from_cache = restored == bundle;

    // Walk the reveal, sometimes skipping like an impatient player.
    let plan = RevealPlan::for_bundle(&bundle);
    let mut sequencer = RevealSequencer::fresh(plan);
    let skipped = driver_rng.r#gen::<f64>() < SKIP_CHANCE;
    if skipped {
        sequencer.skip_to_end();
    } else {
        while !sequencer.is_terminal() {
            sequencer.advance_to_next();
        }
    }
    if sequencer.step() != plan.terminal_step() {
        return Err(format!(
            "reveal stopped at step {} of {}",
            sequencer.step(),
            plan.terminal_step()
        ));
    }

    // Pick a choice and close out the day.
    let scenario = bundle.scenario.as_ref().ok_or("bundle missing scenario")?;
    let pick = driver_rng.gen_range(0..scenario.choices.len());
    let choice = &scenario.choices[pick];
    if verbose {
        log::info!("day {}: chose {}", state.day, choice.label);
    }
    let shift = bundle.shift.value().copied();
    if let Some(shift) = shift.as_ref() {
        state.apply_support_shift(shift);
    }
    let record = DayRecord {
        day: state.day,
        scenario_title: scenario.title.clone(),
        choice: ChoiceRecord {
            id: choice.id.clone(),
            title: choice.label.clone(),
        },
        shift,
    };
    let day_report = DayReport {
        day: state.day,
        milestones,
        degraded: bundle.any_degraded(),
        ticker_items: bundle.ticker_item_count(),
        reveal_steps: sequencer.step(),
        skipped,
        final_progress,
        restored_from_cache,
    };
    state.advance_day(record);
    Ok(day_report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandate_game::{ManualClock, Role};

    fn config(fail_rate: f64, fallback_streak: u32) -> CampaignConfig {
        CampaignConfig {
            role: Role::Athens,
            seed: 1337,
            days: 4,
            fail_rate,
            fallback_streak,
            base_delay_ms: 2,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn clean_campaign_completes_every_day_and_the_epilogue() {
        let report = run_campaign(&config(0.0, 0), ManualClock::new()).await;
        assert!(report.passed(), "failures: {:?}", report.failures);
        assert_eq!(report.days.len(), 4);
        assert!(report.epilogue_headline.is_some());
        for day in &report.days {
            assert_eq!(day.milestones.last(), Some(&100));
            assert_eq!(day.final_progress, 100);
            assert!(day.restored_from_cache);
            assert!(!day.degraded);
        }
    }

    #[test]
    fn flaky_campaign_still_finishes_on_the_manual_clock() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let report = runtime.block_on(run_campaign(&config(0.2, 2), ManualClock::new()));
        // Day 1's scenario is served from the fallback streak but retried
        // past it or accepted flagged; either way the run itself reports
        // what happened rather than panicking.
        assert!(report.days.len() + report.failures.len() >= 1);
    }

    #[tokio::test]
    async fn fallback_streak_shorter_than_retries_never_degrades_content() {
        let report = run_campaign(&config(0.0, 2), ManualClock::new()).await;
        assert!(report.passed(), "failures: {:?}", report.failures);
        assert!(report.days.iter().all(|d| !d.degraded));
    }

    #[tokio::test]
    async fn campaigns_are_reproducible_by_seed() {
        let first = run_campaign(&config(0.05, 0), ManualClock::new()).await;
        let second = run_campaign(&config(0.05, 0), ManualClock::new()).await;
        assert_eq!(first.service_calls, second.service_calls);
        assert_eq!(first.failures, second.failures);
        assert_eq!(
            first.days.iter().map(|d| d.ticker_items).collect::<Vec<_>>(),
            second.days.iter().map(|d| d.ticker_items).collect::<Vec<_>>()
        );
    }
}
