//! Global speed and acceleration governors.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::units::{StepsPerSec, StepsPerSecSquared};

/// Default maximum speed in steps/sec.
pub const DEFAULT_MAX_SPEED: u32 = 4000;

/// Default maximum acceleration in steps/sec².
pub const DEFAULT_MAX_ACCEL: u32 = 2000;

/// System-wide limits. Every motion request is clamped to these.
///
/// Both values are strictly positive; the setters and constructors refuse
/// anything else so a move can never be planned against a zero limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemLimits {
    /// Maximum speed.
    pub max_speed: StepsPerSec,

    /// Maximum acceleration.
    #[serde(alias = "max_acceleration")]
    pub max_accel: StepsPerSecSquared,
}

impl Default for SystemLimits {
    fn default() -> Self {
        Self {
            max_speed: StepsPerSec(DEFAULT_MAX_SPEED),
            max_accel: StepsPerSecSquared(DEFAULT_MAX_ACCEL),
        }
    }
}

impl SystemLimits {
    /// Create limits from signed values (as typed or as persisted).
    ///
    /// # Errors
    ///
    /// Returns an error if either value is zero or negative.
    pub fn new(max_speed: i32, max_accel: i32) -> Result<Self, ConfigError> {
        let mut limits = Self::default();
        limits.set_max_speed(max_speed)?;
        limits.set_max_accel(max_accel)?;
        Ok(limits)
    }

    /// Replace the maximum speed.
    pub fn set_max_speed(&mut self, value: i32) -> Result<(), ConfigError> {
        if value <= 0 {
            return Err(ConfigError::InvalidMaxSpeed(value));
        }
        self.max_speed = StepsPerSec(value as u32);
        Ok(())
    }

    /// Replace the maximum acceleration.
    pub fn set_max_accel(&mut self, value: i32) -> Result<(), ConfigError> {
        if value <= 0 {
            return Err(ConfigError::InvalidMaxAccel(value));
        }
        self.max_accel = StepsPerSecSquared(value as u32);
        Ok(())
    }

    /// Clamp a requested speed to the maximum.
    #[inline]
    pub fn clamp_speed(&self, speed: StepsPerSec) -> StepsPerSec {
        speed.min(self.max_speed)
    }

    /// Clamp a requested acceleration to the maximum.
    #[inline]
    pub fn clamp_accel(&self, accel: StepsPerSecSquared) -> StepsPerSecSquared {
        accel.min(self.max_accel)
    }

    /// Persisted form.
    pub fn to_raw(&self) -> (i32, i32) {
        (
            self.max_speed.0.min(i32::MAX as u32) as i32,
            self.max_accel.0.min(i32::MAX as u32) as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(SystemLimits::new(0, 100), Err(ConfigError::InvalidMaxSpeed(0)));
        assert_eq!(SystemLimits::new(100, -5), Err(ConfigError::InvalidMaxAccel(-5)));

        let mut limits = SystemLimits::default();
        assert!(limits.set_max_speed(-1).is_err());
        assert_eq!(limits.max_speed, StepsPerSec(DEFAULT_MAX_SPEED));
    }

    #[test]
    fn test_clamp() {
        let limits = SystemLimits::new(3000, 1500).unwrap();
        assert_eq!(limits.clamp_speed(StepsPerSec(5000)), StepsPerSec(3000));
        assert_eq!(limits.clamp_speed(StepsPerSec(200)), StepsPerSec(200));
        assert_eq!(
            limits.clamp_accel(StepsPerSecSquared(9000)),
            StepsPerSecSquared(1500)
        );
    }

    #[test]
    fn test_raw_round_trip() {
        let limits = SystemLimits::new(3000, 1500).unwrap();
        let (s, a) = limits.to_raw();
        assert_eq!(SystemLimits::new(s, a).unwrap(), limits);
    }
}
