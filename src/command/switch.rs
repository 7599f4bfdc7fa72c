//! Start switch input.

use embedded_hal::digital::InputPin;

use crate::config::ControllerConfig;
use crate::error::MotorError;

/// Consecutive released reads needed before a release counts.
pub const RELEASE_POLLS: u8 = 3;

/// Momentary start switch that fires once per press, on release.
///
/// Polled from the foreground loop; never blocks waiting for the release.
pub struct StartSwitch<P: InputPin> {
    pin: P,
    active_low: bool,
    pressed: bool,
    released_polls: u8,
}

impl<P: InputPin> StartSwitch<P> {
    /// Wrap the switch input.
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            pressed: false,
            released_polls: 0,
        }
    }

    /// Wrap the switch input with the polarity from `config`.
    pub fn from_config(pin: P, config: &ControllerConfig) -> Self {
        Self::new(pin, config.start_switch_active_low)
    }

    /// Sample the switch. Returns `true` once, when a press is released.
    pub fn poll(&mut self) -> Result<bool, MotorError> {
        let active = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        }
        .map_err(|_| MotorError::PinError)?;

        if active {
            self.pressed = true;
            self.released_polls = 0;
            return Ok(false);
        }
        if !self.pressed {
            return Ok(false);
        }

        self.released_polls += 1;
        if self.released_polls < RELEASE_POLLS {
            return Ok(false);
        }
        self.pressed = false;
        self.released_polls = 0;
        Ok(true)
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.pin
    }
}
