//! Configuration module for stepper-axis.
//!
//! Provides the controller configuration (loaded from TOML with the `std`
//! feature), the system limits and the fixed-point clock timing.

mod limits;
mod system;
pub mod timing;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use limits::{SystemLimits, DEFAULT_MAX_ACCEL, DEFAULT_MAX_SPEED};
pub use system::ControllerConfig;
pub use timing::{ClockTiming, DEFAULT_TICK_RATE_HZ, STEP_UNIT};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{StepsPerSec, StepsPerSecSquared};
