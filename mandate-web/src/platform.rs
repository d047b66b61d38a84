//! Web-specific implementations of the mandate-game platform seams.

use async_trait::async_trait;
use std::time::Duration;

use mandate_game::{Clock, TurnCacheStore};

use crate::dom;

const TURN_CACHE_KEY: &str = "mandate.turn-cache";

/// Monotonic clock over `performance.now()` with `setTimeout` sleeps.
#[derive(Debug, Default)]
pub struct WebClock;

impl WebClock {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl Clock for WebClock {
    fn now(&self) -> Duration {
        Duration::from_secs_f64(dom::performance_now_ms().max(0.0) / 1_000.0)
    }

    async fn sleep(&self, duration: Duration) {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = dom::sleep_ms(millis).await {
            log::warn!("timer failed: {}", dom::js_error_message(&err));
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Turn-cache slot persisted in `localStorage`.
pub struct WebCacheStore;

impl TurnCacheStore for WebCacheStore {
    type Error = WebStorageError;

    fn write(&self, raw: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage()
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))?;
        storage
            .set_item(TURN_CACHE_KEY, raw)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }

    fn read(&self) -> Result<Option<String>, Self::Error> {
        let storage = dom::local_storage()
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))?;
        storage
            .get_item(TURN_CACHE_KEY)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }

    fn delete(&self) -> Result<(), Self::Error> {
        let storage = dom::local_storage()
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))?;
        storage
            .remove_item(TURN_CACHE_KEY)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }
}
