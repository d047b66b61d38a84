//! Browser platform layer for the Mandate turn pipeline.
//!
//! Provides the wasm implementations of the pipeline's platform seams: a
//! monotonic clock over `performance.now()`/`setTimeout` and a
//! `localStorage`-backed turn-cache slot. UI concerns (rendering, routing)
//! live elsewhere; this crate only adapts the browser to
//! [`mandate_game`]'s interfaces.

pub mod dom;
pub mod platform;

// Re-export the pipeline alongside the web adapters
pub use mandate_game::*;
pub use platform::{WebCacheStore, WebClock, WebStorageError};
