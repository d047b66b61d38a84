//! Pipeline tuning knobs, loadable from JSON with sensible defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::acquire::RetryPolicy;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 2_000;
const DEFAULT_PROGRESS_TICK_MS: u64 = 1_000;
const DEFAULT_CREEP_STEP: u8 = 1;
const DEFAULT_CREEP_CAP: u8 = 99;
const DEFAULT_CATCH_UP_MS: u64 = 1_000;

/// Retry/backoff settings for the calls that support fallback detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryCfg {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl RetryCfg {
    /// Concrete policy handed to the retry controller.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

impl Default for RetryCfg {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

/// Progress-bar animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressCfg {
    /// Interval between creep increments.
    pub tick_ms: u64,
    /// Units added per creep tick.
    pub creep_step: u8,
    /// Hard cap while work is outstanding; 100 is reserved for completion.
    pub creep_cap: u8,
    /// Duration of the eased catch-up to 100.
    pub catch_up_ms: u64,
}

impl Default for ProgressCfg {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_PROGRESS_TICK_MS,
            creep_step: DEFAULT_CREEP_STEP,
            creep_cap: DEFAULT_CREEP_CAP,
            catch_up_ms: DEFAULT_CATCH_UP_MS,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub retry: RetryCfg,
    pub progress: ProgressCfg,
}

impl PipelineConfig {
    /// Load configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_named_constants() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.base_delay_ms, 2_000);
        assert_eq!(cfg.progress.creep_cap, 99);
        assert_eq!(cfg.retry.policy().base_delay, Duration::from_secs(2));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = PipelineConfig::from_json(r#"{"retry":{"base_delay_ms":50}}"#).unwrap();
        assert_eq!(cfg.retry.base_delay_ms, 50);
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.progress.tick_ms, 1_000);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(PipelineConfig::from_json("{retry").is_err());
    }
}
