//! STEP/DIR/ENABLE pin wiring.
//!
//! Generic over embedded-hal 1.0 output pins. [`StepOutputs`] belongs to the
//! tick interrupt; [`DriverEnable`] belongs to the foreground.

use embedded_hal::digital::OutputPin;

use crate::error::MotorError;
use crate::motion::{Direction, Tick};

/// STEP and DIR outputs driven from clock ticks.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
pub struct StepOutputs<STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    /// STEP pin (high for one tick per step).
    step_pin: STEP,

    /// DIR pin (high = forward, unless inverted).
    dir_pin: DIR,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether the STEP pin was left high by the previous tick.
    pulse_high: bool,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
}

impl<STEP, DIR> StepOutputs<STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    /// Wrap the STEP and DIR pins. Neither pin is touched until the first
    /// step.
    pub fn new(step_pin: STEP, dir_pin: DIR, invert_direction: bool) -> Self {
        Self {
            step_pin,
            dir_pin,
            current_direction: None,
            pulse_high: false,
            invert_direction,
        }
    }

    /// Drive the pins for one tick.
    ///
    /// Ends the previous pulse, then sets DIR (only on a change) and raises
    /// STEP if the tick emitted a step.
    pub fn apply(&mut self, tick: &Tick) -> Result<(), MotorError> {
        if self.pulse_high {
            self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
            self.pulse_high = false;
        }

        if let Some(direction) = tick.step {
            self.set_direction(direction)?;
            self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
            self.pulse_high = true;
        }

        Ok(())
    }

    /// Direction last written to the DIR pin.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.current_direction
    }

    /// Release the pins.
    pub fn release(self) -> (STEP, DIR) {
        (self.step_pin, self.dir_pin)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), MotorError> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Forward => !self.invert_direction,
            Direction::Reverse => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }
}

/// Driver enable output.
pub struct DriverEnable<EN: OutputPin> {
    pin: EN,
    enabled: bool,
    active_low: bool,
}

impl<EN: OutputPin> DriverEnable<EN> {
    /// Wrap the enable pin. The driver is assumed disabled; call
    /// [`disable`](Self::disable) to force the pin to match.
    pub fn new(pin: EN, active_low: bool) -> Self {
        Self {
            pin,
            enabled: false,
            active_low,
        }
    }

    /// Energise the driver.
    pub fn enable(&mut self) -> Result<(), MotorError> {
        self.write(true)
    }

    /// De-energise the driver.
    pub fn disable(&mut self) -> Result<(), MotorError> {
        self.write(false)
    }

    /// Whether the driver was last enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Release the pin.
    pub fn release(self) -> EN {
        self.pin
    }

    fn write(&mut self, enabled: bool) -> Result<(), MotorError> {
        if enabled != self.active_low {
            self.pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        self.enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    fn step(direction: Direction) -> Tick {
        Tick {
            step: Some(direction),
            event: None,
        }
    }

    #[test]
    fn test_pulse_lasts_one_tick() {
        let step_pin = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let dir_pin = PinMock::new(&[Transaction::set(State::High)]);
        let mut outputs = StepOutputs::new(step_pin, dir_pin, false);

        outputs.apply(&step(Direction::Forward)).unwrap();
        outputs.apply(&Tick::default()).unwrap();
        outputs.apply(&Tick::default()).unwrap();
        outputs.apply(&step(Direction::Forward)).unwrap();
        outputs.apply(&Tick::default()).unwrap();

        let (mut step_pin, mut dir_pin) = outputs.release();
        step_pin.done();
        dir_pin.done();
    }

    #[test]
    fn test_dir_written_on_change_only() {
        let step_pin = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]);
        // inverted: reverse drives DIR high
        let dir_pin = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut outputs = StepOutputs::new(step_pin, dir_pin, true);

        outputs.apply(&step(Direction::Reverse)).unwrap();
        outputs.apply(&step(Direction::Reverse)).unwrap();
        outputs.apply(&step(Direction::Forward)).unwrap();
        assert_eq!(outputs.direction(), Some(Direction::Forward));

        let (mut step_pin, mut dir_pin) = outputs.release();
        step_pin.done();
        dir_pin.done();
    }

    #[test]
    fn test_enable_active_low() {
        let pin = PinMock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let mut enable = DriverEnable::new(pin, true);

        enable.enable().unwrap();
        assert!(enable.is_enabled());
        enable.disable().unwrap();
        assert!(!enable.is_enabled());

        enable.release().done();
    }
}
