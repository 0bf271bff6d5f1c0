//! Millisecond wall clock used to stamp `created` / `modified`
//!
//! The store never reads system time directly; it asks a [`Clock`]. This
//! keeps timestamp generation swappable, and lets tests produce strictly
//! increasing `modified` values so reverse-chronological ordering is
//! deterministic.

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of timestamps, milliseconds since Unix epoch
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Deterministic clock for tests
///
/// Every call to `now_millis` returns the current value and then advances it
/// by `step`, so consecutive writes get strictly increasing timestamps.
#[derive(Debug)]
pub struct ManualClock {
    next: AtomicI64,
    step: i64,
}

impl ManualClock {
    /// Start at `start`, advancing by 1ms per reading
    pub fn new(start: i64) -> Self {
        Self::with_step(start, 1)
    }

    /// Start at `start`, advancing by `step` per reading
    pub fn with_step(start: i64, step: i64) -> Self {
        ManualClock {
            next: AtomicI64::new(start),
            step,
        }
    }

    /// The value the next reading will return
    pub fn peek(&self) -> i64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Jump the clock to `millis`
    pub fn set(&self, millis: i64) {
        self.next.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}
