//! `performance.now()` as a [`Clock`].

use std::time::Duration;

use drawkit::clock::Clock;
use web_sys::Performance;

/// Milliseconds since page load from the high-resolution timer, falling back
/// to wall-clock time relative to construction when `performance` is missing.
pub struct PerformanceClock {
    performance: Option<Performance>,
    origin_ms: f64,
}

impl PerformanceClock {
    #[must_use]
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|w| w.performance());
        let origin_ms = match &performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        };
        Self { performance, origin_ms }
    }

    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        let elapsed = (self.now_ms() - self.origin_ms).max(0.0);
        Duration::from_secs_f64(elapsed / 1000.0)
    }
}
