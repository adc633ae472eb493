//! Monotonic time sources and a deferred throttle.
//!
//! Components never call `Instant::now()` directly. They read a shared
//! [`Clock`], which lets tests drive retries, throttling, taps, holds and pool
//! expiry with a [`ManualClock`] instead of sleeping.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time elapsed since the clock's origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock backed [`Clock`]. Not available on `wasm32-unknown-unknown`;
/// the browser binding supplies its own clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock advanced explicitly. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Fire-at-most-once-per-interval gate with a single pending slot.
///
/// A value offered inside the quiet period replaces any earlier pending
/// value; [`Throttle::poll`] releases it once the interval has elapsed.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fire: Option<Duration>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_fire: None, pending: None }
    }

    /// Returns `value` if it may fire now, otherwise parks it.
    pub fn offer(&mut self, now: Duration, value: T) -> Option<T> {
        if self.is_open(now) {
            self.last_fire = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Release the parked value if its interval has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.pending.is_some() && self.is_open(now) {
            self.last_fire = Some(now);
            return self.pending.take();
        }
        None
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any parked value and reopen the gate.
    pub fn reset(&mut self) {
        self.last_fire = None;
        self.pending = None;
    }

    fn is_open(&self, now: Duration) -> bool {
        self.last_fire
            .is_none_or(|last| now.saturating_sub(last) >= self.interval)
    }
}
