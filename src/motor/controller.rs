//! Motion state machine.
//!
//! The controller runs in the foreground. It plans moves, hands them to the
//! shared step clock as single [`ArmCommand`]s, and advances the move
//! program when the clock reports completion.

use embedded_hal::digital::OutputPin;

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::config::{ClockTiming, ControllerConfig, SystemLimits};
use crate::error::{ConfigError, MotorError, ProgramError, Result};
use crate::motion::{
    plan_move, ArmCommand, ClockEvent, ClockSnapshot, Direction, MotionRequest, SharedClock,
};
use crate::program::{NextAction, ProgramEntry, ProgramTable, RawEntry, Sequencer};
use crate::storage::Settings;

use super::driver::DriverEnable;
use super::state::MotionState;

/// Distance from the current position to a jog's synthetic target.
pub const JOG_DISTANCE: u64 = 1_000_000_000;

/// Something the command layer should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// A move, home or jog finished and the axis is idle.
    MoveComplete {
        /// Final position.
        position: i32,
    },
    /// The program reached its end and the axis is idle.
    ProgramComplete {
        /// Final position.
        position: i32,
    },
    /// A program line could not be planned; the program was stopped.
    ProgramAborted {
        /// Offending line.
        line: usize,
    },
}

/// Single-axis motion controller.
///
/// Generic over the driver enable pin. Borrows the clock it drives so the
/// clock itself can live in a `static` shared with the tick interrupt.
pub struct MotionController<'a, EN: OutputPin> {
    clock: &'a SharedClock,
    driver: DriverEnable<EN>,
    timing: ClockTiming,
    limits: SystemLimits,
    jog_speed: Option<StepsPerSec>,
    program: ProgramTable,
    sequencer: Sequencer,
    state: MotionState,
}

impl<'a, EN: OutputPin> MotionController<'a, EN> {
    /// Create an idle controller from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero tick rate or an invalid seed program.
    pub fn new(
        clock: &'a SharedClock,
        driver: DriverEnable<EN>,
        config: &ControllerConfig,
    ) -> Result<Self> {
        Ok(Self {
            clock,
            driver,
            timing: config.timing()?,
            limits: config.limits,
            jog_speed: config.jog_speed,
            program: config.program_table()?,
            sequencer: Sequencer::new(),
            state: MotionState::Idle,
        })
    }

    /// Replace limits and program with persisted settings.
    pub fn restore(&mut self, settings: Settings) -> Result<()> {
        self.ensure_idle()?;
        self.limits = settings.limits;
        self.program = settings.program;
        Ok(())
    }

    /// Current limits and program, for persistence.
    pub fn settings(&self) -> Settings {
        Settings {
            limits: self.limits,
            program: self.program.clone(),
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Current position in steps.
    #[inline]
    pub fn position(&self) -> i32 {
        self.clock.position()
    }

    /// Consistent copy of the clock state.
    pub fn snapshot(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// Current limits.
    #[inline]
    pub fn limits(&self) -> &SystemLimits {
        &self.limits
    }

    /// Clock timing.
    #[inline]
    pub fn timing(&self) -> &ClockTiming {
        &self.timing
    }

    /// Stored program.
    #[inline]
    pub fn program(&self) -> &ProgramTable {
        &self.program
    }

    /// Whether a program is running.
    #[inline]
    pub fn program_running(&self) -> bool {
        self.sequencer.is_running()
    }

    /// Whether the driver output is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.driver.is_enabled()
    }

    /// Speed used by a jog that gives none.
    pub fn jog_speed(&self) -> StepsPerSec {
        self.jog_speed
            .map(|speed| self.limits.clamp_speed(speed))
            .unwrap_or(self.limits.max_speed)
    }

    /// Move to an absolute position. Missing speed or acceleration use the
    /// limits.
    ///
    /// Returns whether motion started; a move to the current position does
    /// nothing.
    pub fn move_to(
        &mut self,
        target: i32,
        speed: Option<StepsPerSec>,
        accel: Option<StepsPerSecSquared>,
    ) -> Result<bool> {
        self.start_move(target, speed, accel, MotionState::Moving)
    }

    /// Move to position 0.
    pub fn home(
        &mut self,
        speed: Option<StepsPerSec>,
        accel: Option<StepsPerSecSquared>,
    ) -> Result<bool> {
        self.start_move(0, speed, accel, MotionState::Homing)
    }

    /// Move indefinitely in `direction` until [`stop_jog`](Self::stop_jog).
    pub fn jog(&mut self, direction: Direction, speed: Option<StepsPerSec>) -> Result<bool> {
        let target = direction.offset(self.clock.position(), JOG_DISTANCE);
        let speed = speed.unwrap_or_else(|| self.jog_speed());
        self.start_move(target, Some(speed), None, MotionState::Jogging(direction))
    }

    /// Decelerate a jog to a controlled stop.
    ///
    /// The stopping distance is worked out from the speed at the moment the
    /// clock takes the command, so a jog that never reached full speed
    /// stops just as smoothly. Returns whether a stop was started.
    pub fn stop_jog(&mut self) -> bool {
        match self.state {
            MotionState::Jogging(_) => {
                let started = self.clock.apply(ArmCommand::Decelerate);
                #[cfg(feature = "defmt")]
                if started {
                    defmt::debug!("Jog decelerating at {}", self.clock.position());
                }
                started
            }
            _ => false,
        }
    }

    /// Stop immediately and abandon any program.
    ///
    /// Returns whether anything was running.
    pub fn stop(&mut self) -> bool {
        self.clock.apply(ArmCommand::Halt);
        self.sequencer.stop();
        let was_busy = !self.state.is_idle();
        self.state = MotionState::Idle;

        #[cfg(feature = "defmt")]
        if was_busy {
            defmt::debug!("Stopped at {}", self.clock.position());
        }
        was_busy
    }

    /// Make the current position the origin.
    pub fn set_origin(&mut self) -> Result<()> {
        self.ensure_idle()?;
        if !self.clock.apply(ArmCommand::SetOrigin) {
            return Err(MotorError::Busy.into());
        }
        Ok(())
    }

    /// Enable the driver output.
    pub fn enable(&mut self) -> Result<()> {
        Ok(self.driver.enable()?)
    }

    /// Disable the driver output. Motion in progress is not stopped.
    pub fn disable(&mut self) -> Result<()> {
        Ok(self.driver.disable()?)
    }

    /// Set the maximum speed.
    ///
    /// # Errors
    ///
    /// Rejects values that are not positive or that the clock cannot
    /// produce.
    pub fn set_max_speed(&mut self, value: i32) -> Result<()> {
        let bound = self.timing.max_speed();
        if value > 0 && value as u32 > bound.0 {
            return Err(ConfigError::SpeedAboveTickBound {
                speed: value as u32,
                bound: bound.0,
            }
            .into());
        }
        Ok(self.limits.set_max_speed(value)?)
    }

    /// Set the maximum acceleration. Rejects values that are not positive.
    pub fn set_max_accel(&mut self, value: i32) -> Result<()> {
        Ok(self.limits.set_max_accel(value)?)
    }

    /// Write one program line. Allowed while the program runs; the change
    /// applies when that line is reached.
    pub fn set_line(&mut self, line: i32, raw: RawEntry) -> Result<ProgramEntry> {
        self.program.set_line(line, raw)
    }

    /// Reset every program line to the end marker.
    pub fn clear_program(&mut self) {
        self.program.clear();
    }

    /// Run the stored program from line 0.
    ///
    /// Returns a notification if the program finished without moving
    /// (every move was already at its destination).
    pub fn start_program(&mut self) -> Result<Option<Notification>> {
        self.ensure_idle()?;
        if self.program.is_empty() {
            return Err(ProgramError::Empty.into());
        }
        self.driver.enable()?;
        self.sequencer.start();

        #[cfg(feature = "defmt")]
        defmt::debug!("Program started ({} lines)", self.program.len());

        Ok(self.advance())
    }

    /// Handle a completion latched by the clock.
    ///
    /// Call from the foreground loop. Returns what, if anything, should be
    /// reported.
    pub fn poll(&mut self) -> Option<Notification> {
        let event = self.clock.take_event()?;

        match (event, self.state) {
            (ClockEvent::MoveComplete { .. }, MotionState::Moving)
                if self.sequencer.is_running() =>
            {
                self.advance()
            }
            (ClockEvent::MoveComplete { position }, state) if state.is_moving() => {
                self.state = MotionState::Idle;
                #[cfg(feature = "defmt")]
                defmt::debug!("{} complete at {}", state.name(), position);
                Some(Notification::MoveComplete { position })
            }
            (ClockEvent::DwellComplete, MotionState::Dwelling) => self.advance(),
            // stale event from a stopped motion
            _ => None,
        }
    }

    /// Release the enable pin.
    pub fn release(self) -> EN {
        self.driver.release()
    }

    fn ensure_idle(&self) -> core::result::Result<(), MotorError> {
        if self.state.is_idle() {
            Ok(())
        } else {
            Err(MotorError::Busy)
        }
    }

    fn start_move(
        &mut self,
        target: i32,
        speed: Option<StepsPerSec>,
        accel: Option<StepsPerSecSquared>,
        state: MotionState,
    ) -> Result<bool> {
        self.ensure_idle()?;

        let request = MotionRequest::new(
            target,
            speed.unwrap_or(self.limits.max_speed),
            accel.unwrap_or(self.limits.max_accel),
        );
        let profile = plan_move(self.clock.position(), &request, &self.limits, &self.timing)?;
        if profile.is_zero() {
            return Ok(false);
        }

        self.driver.enable()?;
        self.clock.apply(ArmCommand::Move(profile));
        self.state = state;

        #[cfg(feature = "defmt")]
        defmt::debug!("{} to {} at {}", state.name(), target, profile.speed.0);

        Ok(true)
    }

    /// Arm the next program line, skipping moves that are already at their
    /// destination.
    fn advance(&mut self) -> Option<Notification> {
        loop {
            match self.sequencer.next(&self.program, &self.timing) {
                NextAction::Move {
                    line,
                    destination,
                    speed,
                    accel,
                } => {
                    let request = MotionRequest::new(
                        destination,
                        speed,
                        accel.unwrap_or(self.limits.max_accel),
                    );
                    match plan_move(self.clock.position(), &request, &self.limits, &self.timing) {
                        Ok(profile) if profile.is_zero() => continue,
                        Ok(profile) => {
                            self.clock.apply(ArmCommand::Move(profile));
                            self.state = MotionState::Moving;
                            return None;
                        }
                        Err(_e) => {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("Program line {} rejected: {:?}", line, _e);
                            self.sequencer.stop();
                            self.state = MotionState::Idle;
                            return Some(Notification::ProgramAborted { line });
                        }
                    }
                }
                NextAction::Dwell { ticks, .. } => {
                    self.clock.apply(ArmCommand::Dwell { ticks });
                    self.state = MotionState::Dwelling;
                    return None;
                }
                NextAction::EndOfProgram => {
                    self.state = MotionState::Idle;
                    let position = self.clock.position();
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Program complete at {}", position);
                    return Some(Notification::ProgramComplete { position });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct FakePin;

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    fn controller(clock: &SharedClock) -> MotionController<'_, FakePin> {
        MotionController::new(
            clock,
            DriverEnable::new(FakePin, true),
            &ControllerConfig::default(),
        )
        .unwrap()
    }

    /// Tick and poll until something is reported.
    fn run(clock: &SharedClock, ctrl: &mut MotionController<'_, FakePin>) -> Notification {
        for _ in 0..10_000_000u32 {
            clock.tick();
            if let Some(n) = ctrl.poll() {
                return n;
            }
        }
        panic!("nothing reported");
    }

    #[test]
    fn test_move_completes() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);

        assert!(ctrl.move_to(400, None, None).unwrap());
        assert_eq!(ctrl.state(), MotionState::Moving);
        assert!(ctrl.is_enabled());

        assert_eq!(run(&clock, &mut ctrl), Notification::MoveComplete { position: 400 });
        assert_eq!(ctrl.state(), MotionState::Idle);
    }

    #[test]
    fn test_busy_rejects_new_motion() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        ctrl.move_to(400, None, None).unwrap();

        assert_eq!(ctrl.move_to(10, None, None), Err(MotorError::Busy.into()));
        assert_eq!(ctrl.set_origin(), Err(MotorError::Busy.into()));
        assert_eq!(ctrl.start_program(), Err(MotorError::Busy.into()));
    }

    #[test]
    fn test_move_to_current_position_does_nothing() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        assert!(!ctrl.move_to(0, None, None).unwrap());
        assert_eq!(ctrl.state(), MotionState::Idle);
        assert!(!ctrl.is_enabled());
    }

    #[test]
    fn test_stop_freezes_position() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        ctrl.move_to(100_000, None, None).unwrap();
        for _ in 0..40_000 {
            clock.tick();
        }

        assert!(ctrl.stop());
        let at = ctrl.position();
        for _ in 0..1000 {
            clock.tick();
            assert_eq!(ctrl.poll(), None);
        }
        assert_eq!(ctrl.position(), at);
        assert_eq!(ctrl.state(), MotionState::Idle);
        ctrl.set_origin().unwrap();
        assert_eq!(ctrl.position(), 0);
    }

    #[test]
    fn test_home_returns_to_zero() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        ctrl.move_to(-250, None, None).unwrap();
        run(&clock, &mut ctrl);

        assert!(ctrl.home(Some(StepsPerSec(1000)), None).unwrap());
        assert_eq!(ctrl.state(), MotionState::Homing);
        assert_eq!(run(&clock, &mut ctrl), Notification::MoveComplete { position: 0 });
    }

    #[test]
    fn test_jog_stop_before_cruise() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        ctrl.jog(Direction::Forward, Some(StepsPerSec(500))).unwrap();
        // 5 ms in, far below 500 steps/s
        for _ in 0..200 {
            clock.tick();
        }
        assert!(ctrl.stop_jog());

        let Notification::MoveComplete { position } = run(&clock, &mut ctrl) else {
            panic!("expected move complete");
        };
        assert!(position >= 1 && position < 10, "{}", position);
    }

    #[test]
    fn test_stop_jog_when_not_jogging() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        assert!(!ctrl.stop_jog());
        ctrl.move_to(100, None, None).unwrap();
        assert!(!ctrl.stop_jog());
    }

    #[test]
    fn test_max_speed_bounds() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        assert!(ctrl.set_max_speed(0).is_err());
        assert!(ctrl.set_max_speed(-5).is_err());
        assert_eq!(
            ctrl.set_max_speed(30_000),
            Err(ConfigError::SpeedAboveTickBound {
                speed: 30_000,
                bound: 20_000
            }
            .into())
        );
        ctrl.set_max_speed(20_000).unwrap();
        assert_eq!(ctrl.limits().max_speed, StepsPerSec(20_000));
        assert!(ctrl.set_max_accel(0).is_err());
    }

    #[test]
    fn test_empty_program() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        assert_eq!(ctrl.start_program(), Err(ProgramError::Empty.into()));
    }

    #[test]
    fn test_program_skips_moves_in_place() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        ctrl.set_line(0, RawEntry::new(0, 500, 0)).unwrap();
        ctrl.set_line(1, RawEntry::new(50, 500, 0)).unwrap();

        assert_eq!(ctrl.start_program(), Ok(None));
        assert_eq!(ctrl.state(), MotionState::Moving);
        assert_eq!(
            run(&clock, &mut ctrl),
            Notification::ProgramComplete { position: 50 }
        );
        assert!(!ctrl.program_running());
    }

    #[test]
    fn test_stop_abandons_program() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        ctrl.set_line(0, RawEntry::new(5000, 1000, 0)).unwrap();
        ctrl.set_line(1, RawEntry::new(0, 1000, 0)).unwrap();
        ctrl.start_program().unwrap();
        for _ in 0..10_000 {
            clock.tick();
        }

        ctrl.stop();
        assert!(!ctrl.program_running());
        let at = ctrl.position();
        for _ in 0..100_000 {
            clock.tick();
            assert_eq!(ctrl.poll(), None);
        }
        assert_eq!(ctrl.position(), at);
    }

    #[test]
    fn test_restore_settings() {
        let clock = SharedClock::new();
        let mut ctrl = controller(&clock);
        let mut settings = ctrl.settings();
        settings.limits = SystemLimits::new(1234, 567).unwrap();
        settings.program.set_line(0, RawEntry::new(10, 100, 0)).unwrap();

        ctrl.restore(settings.clone()).unwrap();
        assert_eq!(ctrl.settings(), settings);
    }
}
