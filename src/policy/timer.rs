//! On-delay (TON) timer with an explicit elapsed counter.
//!
//! Elapsed time is reported in whole microseconds.  Each scan's interval is
//! taken in picoseconds and the part that does not fill a whole microsecond
//! is carried into the next scan, so sub-microsecond intervals still
//! accumulate and the count never drifts more than half a microsecond from
//! the true sum.  A fixed 10 ms interval reaches a 2 s preset in exactly
//! 200 scans.

use serde::{Deserialize, Serialize};

/// Smallest scan interval the timers can count, in seconds (1 ps).
pub const MIN_DT_SECS: f32 = 1e-12;

const PS_PER_US: i128 = 1_000_000;

/// Convert seconds to whole microseconds (saturating, negative → 0).
pub fn secs_to_us(secs: f32) -> u32 {
    (f64::from(secs) * 1_000_000.0).round() as u32
}

/// Convert seconds to whole picoseconds (saturating, negative → 0).
pub fn secs_to_ps(secs: f32) -> u64 {
    (f64::from(secs) * 1e12).round() as u64
}

/// One timer instance.  Belongs to exactly one pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnDelayTimer {
    elapsed_us: u32,
    /// Sub-microsecond remainder, in [-500_000, 500_000) ps.
    carry_ps: i32,
}

impl OnDelayTimer {
    /// Advance by whole microseconds while `drive` holds, capped at `preset_us`.
    /// A false drive resets the count.
    #[must_use]
    pub fn advance(self, drive: bool, dt_us: u32, preset_us: u32) -> Self {
        self.advance_ps(drive, u64::from(dt_us) * 1_000_000, preset_us)
    }

    /// Advance by `dt_ps` picoseconds while `drive` holds, capped at
    /// `preset_us`.  A false drive resets the count.
    #[must_use]
    pub fn advance_ps(self, drive: bool, dt_ps: u64, preset_us: u32) -> Self {
        if !drive {
            return Self::default();
        }
        let total_ps = i128::from(dt_ps) + i128::from(self.carry_ps);
        let whole_us = (total_ps + PS_PER_US / 2).div_euclid(PS_PER_US);
        let elapsed = i128::from(self.elapsed_us) + whole_us;
        if elapsed >= i128::from(preset_us) {
            return Self {
                elapsed_us: preset_us,
                carry_ps: 0,
            };
        }
        Self {
            // Below the preset, so within u32.
            elapsed_us: elapsed as u32,
            carry_ps: (total_ps - whole_us * PS_PER_US) as i32,
        }
    }

    /// `Q` output: elapsed has reached the preset.
    pub fn done(self, preset_us: u32) -> bool {
        self.elapsed_us >= preset_us
    }

    pub fn elapsed_us(self) -> u32 {
        self.elapsed_us
    }

    pub fn elapsed_secs(self) -> f32 {
        self.elapsed_us as f32 / 1_000_000.0
    }
}
