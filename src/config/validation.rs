//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::ControllerConfig;

/// Validate a controller configuration.
///
/// Checks:
/// - The tick rate is nonzero
/// - Both limits are strictly positive
/// - The maximum speed is reachable at the tick rate
/// - Every seed program line is a valid entry
pub fn validate_config(config: &ControllerConfig) -> Result<()> {
    let timing = config.timing()?;

    if config.limits.max_speed.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxSpeed(0)));
    }
    if config.limits.max_accel.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxAccel(0)));
    }

    let bound = timing.max_speed();
    if config.limits.max_speed > bound {
        return Err(Error::Config(ConfigError::SpeedAboveTickBound {
            speed: config.limits.max_speed.0,
            bound: bound.0,
        }));
    }

    config.program_table()?;

    Ok(())
}
