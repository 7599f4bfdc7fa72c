//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::ControllerConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_axis::load_config;
///
/// let config = load_config("axis.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ControllerConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<ControllerConfig> {
    let config: ControllerConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::StepsPerSec;
    use crate::program::RawEntry;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
tick_rate_hz = 20000
jog_speed = 800
start_switch_active_low = false

[limits]
max_speed = 3000
max_accel = 1500

[[program]]
destination = 2000
rate = 3000
accel = 1500

[[program]]
destination = 0
rate = 0
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.tick_rate_hz, 20_000);
        assert_eq!(config.jog_speed(), StepsPerSec(800));
        assert!(!config.start_switch_active_low);
        assert_eq!(config.limits.max_speed, StepsPerSec(3000));
        assert_eq!(config.program.len(), 2);
        assert_eq!(config.program[0], RawEntry::new(2000, 3000, 1500));
        assert_eq!(config.program_table().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse_config("tick_rate_hz = \"fast\"");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/axis.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
    }
}
