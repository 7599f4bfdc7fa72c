//! Step clock timing and fixed-point scaling.
//!
//! All per-tick constants are derived here once so the tick handler only
//! ever adds and compares integers.

use crate::error::ConfigError;

use super::units::{StepsPerSec, StepsPerSecSquared};

/// Fixed-point value of one whole step in accumulator units.
pub const STEP_UNIT: u64 = 1 << 32;

/// Default tick rate of the step clock in Hz.
pub const DEFAULT_TICK_RATE_HZ: u32 = 40_000;

/// Derived timing parameters for a step clock running at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTiming {
    tick_rate_hz: u32,
}

impl Default for ClockTiming {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

impl ClockTiming {
    /// Create timing for a clock ticking at `tick_rate_hz`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTickRate` for a zero rate.
    pub fn new(tick_rate_hz: u32) -> Result<Self, ConfigError> {
        if tick_rate_hz == 0 {
            return Err(ConfigError::InvalidTickRate(tick_rate_hz));
        }
        Ok(Self { tick_rate_hz })
    }

    /// Tick rate in Hz.
    #[inline]
    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// Highest speed the clock can produce.
    ///
    /// A pulse is high for one tick and low for at least one, so a step can
    /// be emitted at most every other tick.
    #[inline]
    pub fn max_speed(&self) -> StepsPerSec {
        StepsPerSec((self.tick_rate_hz / 2).max(1))
    }

    /// Speed rescaled to accumulator units per tick.
    #[inline]
    pub fn speed_per_tick(&self, speed: StepsPerSec) -> u64 {
        let speed = speed.min(self.max_speed());
        (speed.0 as u64 * STEP_UNIT) / self.tick_rate_hz as u64
    }

    /// Acceleration rescaled to accumulator units per tick², never zero.
    #[inline]
    pub fn accel_per_tick(&self, accel: StepsPerSecSquared) -> u64 {
        let rate = self.tick_rate_hz as u64;
        ((accel.0 as u64 * STEP_UNIT) / (rate * rate)).max(1)
    }

    /// Number of ticks in a dwell of `millis` milliseconds (at least one).
    #[inline]
    pub fn millis_to_ticks(&self, millis: u32) -> u64 {
        ((millis as u64 * self.tick_rate_hz as u64) / 1000).max(1)
    }
}
