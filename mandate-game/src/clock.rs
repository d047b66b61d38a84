//! Monotonic clock seam for timers and backoff delays.
//!
//! All waiting in the pipeline goes through [`Clock`] so tests can fast-forward
//! deterministically instead of sleeping on the wall clock. Platform layers
//! provide the real implementations (browser timers on wasm, tokio natively).

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::time::Duration;

/// Monotonic time source plus a cooperative sleep.
///
/// `now` is measured from an arbitrary per-clock epoch and never goes
/// backwards. Futures are not required to be `Send`: the pipeline multiplexes
/// everything onto one logical thread of control.
#[async_trait(?Send)]
pub trait Clock {
    /// Time elapsed since this clock's epoch.
    fn now(&self) -> Duration;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Deterministic clock for tests and scripted harnesses.
///
/// `sleep` advances the clock immediately and records the requested duration,
/// so timer-driven logic can be exercised without real delays.
#[derive(Debug, Default)]
pub struct ManualClock {
    inner: Mutex<ManualClockInner>,
}

#[derive(Debug, Default)]
struct ManualClockInner {
    now: Duration,
    slept: Vec<Duration>,
}

impl ManualClock {
    /// Create a clock at epoch zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        let mut inner = self.inner.lock().expect("manual clock poisoned");
        inner.now += duration;
    }

    /// Every sleep requested so far, in order.
    #[must_use]
    pub fn slept(&self) -> Vec<Duration> {
        self.inner.lock().expect("manual clock poisoned").slept.clone()
    }

    /// Sum of all sleeps requested so far.
    #[must_use]
    pub fn total_slept(&self) -> Duration {
        self.inner
            .lock()
            .expect("manual clock poisoned")
            .slept
            .iter()
            .sum()
    }
}

#[async_trait(?Send)]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.inner.lock().expect("manual clock poisoned").now
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut inner = self.inner.lock().expect("manual clock poisoned");
            inner.now += duration;
            inner.slept.push(duration);
        }
        // Yield once so sibling futures sharing the task still interleave.
        YieldOnce(false).await;
    }
}

struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Native clock backed by the tokio timer wheel.
#[cfg(feature = "tokio-clock")]
#[derive(Debug)]
pub struct TokioClock {
    start: tokio::time::Instant,
}

#[cfg(feature = "tokio-clock")]
impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }
}

#[cfg(feature = "tokio-clock")]
impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "tokio-clock")]
#[async_trait(?Send)]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
