//! Controller configuration - root configuration structure.

use heapless::Vec;
use serde::Deserialize;

use crate::error::Result;
use crate::program::{ProgramTable, RawEntry, PROGRAM_CAPACITY};

use super::limits::SystemLimits;
use super::timing::{ClockTiming, DEFAULT_TICK_RATE_HZ};
use super::units::StepsPerSec;

fn default_tick_rate() -> u32 {
    DEFAULT_TICK_RATE_HZ
}

fn default_active_low() -> bool {
    true
}

/// Root configuration structure from TOML.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControllerConfig {
    /// Step clock rate in Hz.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: u32,

    /// Initial speed and acceleration limits, used until settings are
    /// loaded from storage.
    #[serde(default)]
    pub limits: SystemLimits,

    /// Default jog speed. Falls back to the maximum speed.
    #[serde(default)]
    pub jog_speed: Option<StepsPerSec>,

    /// Whether the start switch reads low when pressed.
    #[serde(default = "default_active_low")]
    pub start_switch_active_low: bool,

    /// Program seeded into a fresh table when storage holds nothing.
    #[serde(default)]
    pub program: Vec<RawEntry, PROGRAM_CAPACITY>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            limits: SystemLimits::default(),
            jog_speed: None,
            start_switch_active_low: true,
            program: Vec::new(),
        }
    }
}

impl ControllerConfig {
    /// Clock timing for the configured tick rate.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero tick rate.
    pub fn timing(&self) -> Result<ClockTiming> {
        Ok(ClockTiming::new(self.tick_rate_hz)?)
    }

    /// Jog speed to use when a jog command gives none.
    pub fn jog_speed(&self) -> StepsPerSec {
        self.jog_speed
            .map(|speed| self.limits.clamp_speed(speed))
            .unwrap_or(self.limits.max_speed)
    }

    /// Build the seed program table.
    ///
    /// # Errors
    ///
    /// Returns an error if a seed line is not a valid entry.
    pub fn program_table(&self) -> Result<ProgramTable> {
        ProgramTable::from_raw(&self.program)
    }
}
