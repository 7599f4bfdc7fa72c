//! Fixed-point step clock.
//!
//! The clock owns every field the tick handler touches. The foreground only
//! changes it through [`ArmCommand`]s, each applied in one piece.

use crate::config::timing::STEP_UNIT;

use super::profile::{stopping_distance, Direction, MotionPhase, Profile};

/// Something the clock finished, for the foreground to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEvent {
    /// The position reached the target and motion stopped.
    MoveComplete {
        /// Final position.
        position: i32,
    },
    /// A dwell counted down to zero.
    DwellComplete,
}

/// Output of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// Direction of the step emitted this tick, if any.
    pub step: Option<Direction>,
    /// Event raised this tick, if any. Also latched for `take_event`.
    pub event: Option<ClockEvent>,
}

/// A single, atomic change to the clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmCommand {
    /// Start executing a planned profile from rest.
    Move(Profile),
    /// Count down a dwell.
    Dwell {
        /// Dwell length in ticks.
        ticks: u64,
    },
    /// Stop at the current position and cancel any dwell. No event is
    /// raised for the interrupted move.
    Halt,
    /// Decelerate to a stop from the current speed.
    Decelerate,
    /// Make the current position the origin. Ignored while busy.
    SetOrigin,
}

/// Copy of the clock state for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSnapshot {
    /// Current position.
    pub position: i32,
    /// Current target.
    pub target: i32,
    /// Current phase.
    pub phase: MotionPhase,
    /// Current speed in accumulator units per tick.
    pub speed: u64,
    /// Whether a move is executing.
    pub running: bool,
    /// Remaining dwell ticks.
    pub dwell_ticks: u64,
}

/// Accumulator-based step generator.
#[derive(Debug, Clone)]
pub struct StepClock {
    position: i32,
    target: i32,
    profile: Profile,
    phase: MotionPhase,
    speed: u64,
    accumulator: u64,
    dwell_ticks: u64,
    running: bool,
    pending: Option<ClockEvent>,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StepClock {
    /// Create a stopped clock at position 0.
    pub const fn new() -> Self {
        Self {
            position: 0,
            target: 0,
            profile: Profile::zero(0),
            phase: MotionPhase::Complete,
            speed: 0,
            accumulator: 0,
            dwell_ticks: 0,
            running: false,
            pending: None,
        }
    }

    /// Advance one tick.
    ///
    /// Constant time, no allocation, integer arithmetic only.
    pub fn tick(&mut self) -> Tick {
        let mut out = Tick::default();

        if self.dwell_ticks > 0 {
            self.dwell_ticks -= 1;
            if self.dwell_ticks == 0 {
                out.event = Some(self.latch(ClockEvent::DwellComplete));
            }
            return out;
        }

        if !self.running || self.position == self.target {
            if self.running {
                self.running = false;
                self.phase = MotionPhase::Complete;
                self.speed = 0;
                out.event = Some(self.latch(ClockEvent::MoveComplete {
                    position: self.position,
                }));
            }
            return out;
        }

        if self.phase != MotionPhase::Decelerating && self.profile.decel_reached(self.position) {
            self.phase = MotionPhase::Decelerating;
        }

        let accel = self.profile.accel_per_tick;
        if self.phase == MotionPhase::Decelerating {
            self.speed = self
                .speed
                .saturating_sub(accel)
                .max(self.profile.speed_floor);
        } else {
            self.speed = (self.speed + accel).min(self.profile.speed_ceiling);
            self.phase = if self.speed == self.profile.speed_ceiling {
                MotionPhase::Cruising
            } else {
                MotionPhase::Accelerating
            };
        }

        self.accumulator += self.speed;
        if self.accumulator >= STEP_UNIT {
            self.accumulator -= STEP_UNIT;
            let direction = self.profile.direction;
            self.position = direction.offset(self.position, 1);
            out.step = Some(direction);
        }

        out
    }

    /// Apply a foreground command. Returns whether it took effect.
    pub fn apply(&mut self, command: ArmCommand) -> bool {
        match command {
            ArmCommand::Move(profile) => {
                if profile.is_zero() {
                    return false;
                }
                self.profile = profile;
                self.target = profile.target;
                self.phase = MotionPhase::Accelerating;
                self.speed = 0;
                self.dwell_ticks = 0;
                self.running = true;
                self.pending = None;
                true
            }
            ArmCommand::Dwell { ticks } => {
                self.dwell_ticks = ticks.max(1);
                self.running = false;
                self.pending = None;
                true
            }
            ArmCommand::Halt => {
                self.target = self.position;
                self.profile.target = self.position;
                self.running = false;
                self.phase = MotionPhase::Complete;
                self.speed = 0;
                self.dwell_ticks = 0;
                self.pending = None;
                true
            }
            ArmCommand::Decelerate => self.begin_stop(),
            ArmCommand::SetOrigin => {
                if self.is_busy() {
                    return false;
                }
                self.position = 0;
                self.target = 0;
                true
            }
        }
    }

    /// Take the latched event, if any.
    #[inline]
    pub fn take_event(&mut self) -> Option<ClockEvent> {
        self.pending.take()
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Current fractional step accumulator.
    #[inline]
    pub fn accumulator(&self) -> u64 {
        self.accumulator
    }

    /// Current speed in accumulator units per tick.
    #[inline]
    pub fn speed(&self) -> u64 {
        self.speed
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Profile being executed (or last executed).
    #[inline]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Whether a move or dwell is in progress.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.running || self.dwell_ticks > 0
    }

    /// Copy of the reportable state.
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            position: self.position,
            target: self.target,
            phase: self.phase,
            speed: self.speed,
            running: self.running,
            dwell_ticks: self.dwell_ticks,
        }
    }

    fn latch(&mut self, event: ClockEvent) -> ClockEvent {
        self.pending = Some(event);
        event
    }

    /// Pull the target in to the stopping distance at the current speed and
    /// decelerate. A target already closer than that is kept.
    fn begin_stop(&mut self) -> bool {
        if !self.running || self.position == self.target {
            return false;
        }

        let direction = self.profile.direction;
        let needed = stopping_distance(self.speed, self.profile.accel_per_tick);
        let remaining = (self.target as i64 - self.position as i64).unsigned_abs();
        if needed < remaining {
            self.target = direction.offset(self.position, needed);
            self.profile.target = self.target;
        }
        self.profile.decel_at = self.position;
        self.phase = MotionPhase::Decelerating;
        true
    }
}
