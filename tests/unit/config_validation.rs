//! Unit tests for configuration validation.

use stepper_axis::config::{parse_config, validate_config, ControllerConfig};
use stepper_axis::error::{ConfigError, Error, ProgramError};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = ControllerConfig::default();
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a zero limit.
#[test]
fn test_zero_max_speed() {
    let toml_str = r#"
[limits]
max_speed = 0
max_accel = 1000
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMaxSpeed(0)))
    ));
}

/// Test validation fails when the clock cannot reach the maximum speed.
#[test]
fn test_max_speed_above_clock_bound() {
    let toml_str = r#"
tick_rate_hz = 4000

[limits]
max_speed = 4000
max_accel = 1000
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::SpeedAboveTickBound {
            speed: 4000,
            bound: 2000
        }))
    ));
}

/// Test validation fails for a meaningless seed program line.
#[test]
fn test_invalid_seed_line() {
    let toml_str = r#"
[[program]]
destination = 100
rate = -20
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Program(ProgramError::InvalidEntry { rate: -20, .. }))
    ));
}

/// Test validation fails for a zero tick rate.
#[test]
fn test_zero_tick_rate() {
    let result = parse_config("tick_rate_hz = 0");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidTickRate(0)))
    ));
}
