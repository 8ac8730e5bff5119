//! Monotonic time sources for emitter scheduling.
//!
//! Delay/duration deadlines and emission pacing all compare against an
//! injected clock, so hosts and tests can step time explicitly instead of
//! depending on wall time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic clock measured from an arbitrary fixed origin.
pub trait EmitterClock: Send + Sync {
    /// Time elapsed since the clock's origin. Must never decrease.
    fn now(&self) -> Duration;
}

/// Default clock backed by `std::time::Instant`.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl EmitterClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually stepped clock. Cloned handles share the same time, so a host or
/// test can keep one handle and hand a clone to the emitter.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Advance the shared time by `by`.
    pub fn advance(&self, by: Duration) {
        self.micros.fetch_add(by.as_micros() as u64, Ordering::Relaxed);
    }

    /// Set the shared time to `to`.
    pub fn set(&self, to: Duration) {
        self.micros.store(to.as_micros() as u64, Ordering::Relaxed);
    }
}

impl EmitterClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_shares_time_across_clones() {
        let clock = ManualClock::default();
        let handle = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(handle.now(), Duration::from_millis(250));
        handle.set(Duration::from_secs(2));
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[test]
    fn monotonic_clock_never_decreases() {
        let clock = MonotonicClock::default();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
