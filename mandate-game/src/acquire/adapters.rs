//! One adapter per remote generation capability.
//!
//! Adapters own their request payloads and their minimal-shape validation;
//! the orchestrator only sees typed results. The transport underneath is
//! opaque: a method name plus a JSON payload each way.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::GenerationService;
use crate::content::{
    AdvisorBrief, ConsequenceReport, DayScenario, RunEpilogue, ScenarioAnalysis, SupportShift,
    TickerFeed,
};
use crate::snapshot::TurnRequestSnapshot;

use super::GenerationError;

pub(crate) const METHOD_SCENARIO: &str = "turn.scenario";
pub(crate) const METHOD_TICKER: &str = "turn.ticker";
pub(crate) const METHOD_ADVISORY: &str = "turn.advisory";
pub(crate) const METHOD_CONSEQUENCES: &str = "turn.consequences";
pub(crate) const METHOD_SHIFT: &str = "turn.support_shift";
pub(crate) const METHOD_ANALYSIS: &str = "turn.analysis";
pub(crate) const METHOD_EPILOGUE: &str = "run.epilogue";

async fn request<G, T>(
    service: &G,
    method: &str,
    payload: Value,
) -> Result<T, GenerationError>
where
    G: GenerationService + ?Sized,
    T: DeserializeOwned,
{
    let raw = service.generate(method, payload).await?;
    Ok(serde_json::from_value(raw)?)
}

/// Mandatory primary content. The only adapter whose failure is fatal.
pub(crate) async fn fetch_scenario<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
) -> Result<DayScenario, GenerationError>
where
    G: GenerationService + ?Sized,
{
    let scenario: DayScenario =
        request(service, METHOD_SCENARIO, snapshot.to_payload()?).await?;
    if !scenario.shape_valid() {
        return Err(GenerationError::Shape(format!(
            "scenario must have a title, a body, and exactly {} choices",
            crate::content::SCENARIO_CHOICE_COUNT
        )));
    }
    Ok(scenario)
}

pub(crate) async fn fetch_ticker<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
) -> Result<TickerFeed, GenerationError>
where
    G: GenerationService + ?Sized,
{
    request(service, METHOD_TICKER, snapshot.to_payload()?).await
}

pub(crate) async fn fetch_advisory<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
) -> Result<AdvisorBrief, GenerationError>
where
    G: GenerationService + ?Sized,
{
    request(service, METHOD_ADVISORY, snapshot.to_payload()?).await
}

/// Consequence narrative for the previous choice; only callable when the
/// snapshot carries one.
pub(crate) async fn fetch_consequences<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
) -> Result<ConsequenceReport, GenerationError>
where
    G: GenerationService + ?Sized,
{
    let report: ConsequenceReport =
        request(service, METHOD_CONSEQUENCES, snapshot.to_payload()?).await?;
    if !report.shape_valid() {
        return Err(GenerationError::Shape(
            "consequence report must have a summary".to_string(),
        ));
    }
    Ok(report)
}

pub(crate) async fn fetch_shift<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
) -> Result<SupportShift, GenerationError>
where
    G: GenerationService + ?Sized,
{
    request(service, METHOD_SHIFT, snapshot.to_payload()?).await
}

/// Dependent-phase analysis; the payload carries the phase-1 scenario text.
pub(crate) async fn fetch_analysis<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
    scenario: &DayScenario,
) -> Result<ScenarioAnalysis, GenerationError>
where
    G: GenerationService + ?Sized,
{
    let payload = json!({
        "snapshot": snapshot.to_payload()?,
        "scenario_title": scenario.title,
        "scenario_body": scenario.body,
    });
    let analysis: ScenarioAnalysis = request(service, METHOD_ANALYSIS, payload).await?;
    if !analysis.shape_valid() {
        return Err(GenerationError::Shape(
            "analysis must have an assessment".to_string(),
        ));
    }
    Ok(analysis)
}

/// Whole-run summary requested once the campaign ends.
pub(crate) async fn fetch_epilogue<G>(
    service: &G,
    snapshot: &TurnRequestSnapshot,
) -> Result<RunEpilogue, GenerationError>
where
    G: GenerationService + ?Sized,
{
    let epilogue: RunEpilogue =
        request(service, METHOD_EPILOGUE, snapshot.to_payload()?).await?;
    if !epilogue.shape_valid() {
        return Err(GenerationError::Shape(
            "epilogue must have a headline and a body".to_string(),
        ));
    }
    Ok(epilogue)
}
