//! Unit tests for TOML configuration parsing.

use stepper_axis::config::{load_config, parse_config, ControllerConfig, DEFAULT_TICK_RATE_HZ};
use stepper_axis::error::{ConfigError, Error};
use stepper_axis::{ProgramEntry, StepsPerSec, StepsPerSecSquared};

/// Test parsing a complete controller configuration from TOML.
#[test]
fn test_parse_controller_config() {
    let toml_str = r#"
tick_rate_hz = 50000
jog_speed = 1200
start_switch_active_low = true

[limits]
max_speed = 6000
max_accel = 9000
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.tick_rate_hz, 50_000);
    assert_eq!(config.limits.max_speed, StepsPerSec(6000));
    assert_eq!(config.limits.max_accel, StepsPerSecSquared(9000));
    assert_eq!(config.jog_speed(), StepsPerSec(1200));
    assert!(config.start_switch_active_low);
}

/// Test the long spelling of the acceleration key.
#[test]
fn test_parse_max_acceleration_alias() {
    let toml_str = r#"
[limits]
max_speed = 1000
max_acceleration = 700
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    assert_eq!(config.limits.max_accel, StepsPerSecSquared(700));
}

/// Test parsing a seed program with a move, a dwell and the end marker.
#[test]
fn test_parse_seed_program() {
    let toml_str = r#"
[[program]]
destination = 2000
rate = 3000
accel = 1500

[[program]]
destination = 250
rate = 0

[[program]]
destination = 0
rate = 1000
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let table = config.program_table().expect("Seed program should be valid");

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(1), Some(ProgramEntry::Dwell { millis: 250 }));
    assert_eq!(
        table.get(2),
        Some(ProgramEntry::Move {
            destination: 0,
            speed: StepsPerSec(1000),
            accel: None,
        })
    );
}

/// Test that every field falls back to its default.
#[test]
fn test_parse_defaults() {
    let config = parse_config("").expect("Empty config should parse");
    assert_eq!(config.tick_rate_hz, DEFAULT_TICK_RATE_HZ);
    assert_eq!(config, ControllerConfig::default());
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join(format!("stepper-axis-config-{}.toml", std::process::id()));
    std::fs::write(&path, "tick_rate_hz = 30000\n").unwrap();

    let config = load_config(&path).expect("Config file should load");
    assert_eq!(config.tick_rate_hz, 30_000);

    std::fs::remove_file(&path).unwrap();
}

/// Test that malformed TOML is a parse error.
#[test]
fn test_parse_malformed() {
    let result = parse_config("[limits\nmax_speed = ");
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}
