//! Host time adapter.
//!
//! Measures the interval between scans for a free-running control loop and
//! paces a fixed-interval loop against the wall clock.

use std::time::{Duration, Instant};

/// Monotonic clock measuring the time between consecutive scans.
pub struct MonotonicClock {
    start: Instant,
    last: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Seconds since construction.
    pub fn uptime_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the previous call (or construction).
    pub fn lap_secs(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }

    /// Sleep until `interval` has passed since the previous lap, then lap.
    /// Returns the measured interval.  Never returns zero.
    pub fn pace(&mut self, interval: Duration) -> f32 {
        let due = self.last + interval;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        self.lap_secs().max(f32::MIN_POSITIVE)
    }
}
