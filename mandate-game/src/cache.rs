//! Single-slot turn cache surviving screen-to-screen navigation.
//!
//! Holds at most one serialized bundle. A load consumes the slot whatever
//! happens next, and an entry written for a different turn identifier is
//! treated as a miss: stale content must never reappear after the player
//! has moved on out-of-band.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::bundle::TurnBundle;

/// Backing store seam: any local key-value string store will do.
/// Platform-specific implementations should provide this.
pub trait TurnCacheStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replace the slot's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    fn write(&self, raw: &str) -> Result<(), Self::Error>;

    /// Current slot contents, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn read(&self) -> Result<Option<String>, Self::Error>;

    /// Empty the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be removed.
    fn delete(&self) -> Result<(), Self::Error>;
}

/// What gets serialized into the slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnCacheEntry {
    pub bundle: TurnBundle,
    pub turn_id: String,
    pub captured_at_ms: u64,
}

/// Staleness-guarded wrapper around the store.
pub struct TurnCache<S: TurnCacheStore> {
    store: S,
}

impl<S: TurnCacheStore> TurnCache<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Stash a ready bundle so a return visit can restore it instantly.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized or persisted.
    pub fn save(&self, bundle: &TurnBundle, captured_at_ms: u64) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let entry = TurnCacheEntry {
            bundle: bundle.clone(),
            turn_id: bundle.turn_id.clone(),
            captured_at_ms,
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.write(&raw).map_err(Into::into)
    }

    /// Take the cached bundle if it belongs to `current_turn_id`.
    ///
    /// The slot is cleared no matter what: a second load in the same turn
    /// lifecycle returns nothing, and a mismatched or unreadable entry is
    /// silently a miss.
    pub fn load_and_consume(&self, current_turn_id: &str) -> Option<TurnBundle> {
        let raw = match self.store.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("turn cache read failed, treating as miss: {err}");
                return None;
            }
        };
        if let Err(err) = self.store.delete() {
            warn!("turn cache clear failed: {err}");
        }
        let entry: TurnCacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("turn cache entry unreadable, treating as miss: {err}");
                return None;
            }
        };
        if entry.turn_id != current_turn_id {
            warn!(
                "turn cache entry for {} discarded, current turn is {current_turn_id}",
                entry.turn_id
            );
            return None;
        }
        Some(entry.bundle)
    }

    /// Drop whatever the slot holds.
    pub fn clear(&self) {
        if let Err(err) = self.store.delete() {
            warn!("turn cache clear failed: {err}");
        }
    }
}

/// In-memory store for native runs and tests.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    slot: std::sync::Mutex<Option<String>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TurnCacheStore for MemoryCacheStore {
    type Error = std::convert::Infallible;

    fn write(&self, raw: &str) -> Result<(), Self::Error> {
        *self.slot.lock().expect("cache slot poisoned") = Some(raw.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.slot.lock().expect("cache slot poisoned").clone())
    }

    fn delete(&self) -> Result<(), Self::Error> {
        *self.slot.lock().expect("cache slot poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::TurnBundle;

    fn cache() -> TurnCache<MemoryCacheStore> {
        TurnCache::new(MemoryCacheStore::new())
    }

    fn bundle(turn_id: &str) -> TurnBundle {
        TurnBundle::new(2, turn_id.to_string())
    }

    #[test]
    fn entry_is_consumed_by_the_first_read() {
        let cache = cache();
        cache.save(&bundle("AT-AGORA42:2"), 1_234).unwrap();

        let restored = cache.load_and_consume("AT-AGORA42:2");
        assert!(restored.is_some());
        assert_eq!(restored.unwrap().turn_id, "AT-AGORA42:2");

        assert!(cache.load_and_consume("AT-AGORA42:2").is_none());
    }

    #[test]
    fn mismatched_identifier_is_a_silent_miss_and_still_consumes() {
        let cache = cache();
        cache.save(&bundle("AT-AGORA42:2"), 1_234).unwrap();

        assert!(cache.load_and_consume("AT-AGORA42:3").is_none());
        // The stale entry is gone too.
        assert!(cache.load_and_consume("AT-AGORA42:2").is_none());
    }

    #[test]
    fn corrupt_entry_is_a_silent_miss() {
        let store = MemoryCacheStore::new();
        store.write("{not json").unwrap();
        let cache = TurnCache::new(store);
        assert!(cache.load_and_consume("AT-AGORA42:2").is_none());
    }

    #[test]
    fn save_overwrites_the_single_slot() {
        let cache = cache();
        cache.save(&bundle("AT-AGORA42:2"), 1).unwrap();
        cache.save(&bundle("AT-AGORA42:3"), 2).unwrap();

        assert!(cache.load_and_consume("AT-AGORA42:2").is_none());
    }

    #[test]
    fn clear_empties_the_slot() {
        let cache = cache();
        cache.save(&bundle("AT-AGORA42:2"), 1).unwrap();
        cache.clear();
        assert!(cache.load_and_consume("AT-AGORA42:2").is_none());
    }
}
