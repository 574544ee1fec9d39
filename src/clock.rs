//! Time sources for drift checks and seek watchdogs.
//!
//! The engine never reads wall time directly. Everything goes through
//! [`Clock`] so tests can drive time by hand.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Block the calling thread (or pretend to) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Hand-driven clock for tests and offline simulation.
///
/// `sleep` advances the clock instead of blocking. An optional auto-advance
/// step is added on every `now()` read so busy loops without sleeps still
/// make progress.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    auto_advance: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock that moves forward by `step` every time it is read.
    pub fn with_auto_advance(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            auto_advance: step,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        if secs > 0.0 {
            self.advance(Duration::from_secs_f64(secs));
        }
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.auto_advance);
        now
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
