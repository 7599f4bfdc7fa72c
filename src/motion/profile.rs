//! Trapezoidal profile planning.
//!
//! Converts a move request into the handful of fixed-point constants the
//! step clock needs. Runs once per move in the foreground; nothing here is
//! called from the tick handler.

use libm::sqrtf;

use crate::config::timing::STEP_UNIT;
use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::config::{ClockTiming, SystemLimits};
use crate::error::MotionError;

/// Direction of travel along the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Increasing position.
    Forward,
    /// Decreasing position.
    Reverse,
}

impl Direction {
    /// Get direction from a signed step delta.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Position `steps` further along this direction, saturating at the
    /// ends of the `i32` range.
    #[inline]
    pub fn offset(self, from: i32, steps: u64) -> i32 {
        let to = from as i64 + self.sign() * steps.min(u32::MAX as u64) as i64;
        to.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// Current phase of motion execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Accelerating from rest toward the speed ceiling.
    Accelerating,
    /// Moving at the speed ceiling.
    Cruising,
    /// Decelerating toward the target.
    Decelerating,
    /// No motion.
    Complete,
}

/// A request to move to an absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionRequest {
    /// Absolute target position in steps.
    pub target: i32,
    /// Requested speed (clamped to the system limit).
    pub speed: StepsPerSec,
    /// Requested acceleration (clamped to the system limit).
    pub accel: StepsPerSecSquared,
}

impl MotionRequest {
    /// Create a request.
    pub const fn new(target: i32, speed: StepsPerSec, accel: StepsPerSecSquared) -> Self {
        Self {
            target,
            speed,
            accel,
        }
    }
}

/// Computed constants for one move. Immutable once planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    /// Absolute target position.
    pub target: i32,

    /// Direction of motion.
    pub direction: Direction,

    /// Total steps to move.
    pub distance: u32,

    /// Speed increment per tick, in accumulator units per tick².
    pub accel_per_tick: u64,

    /// Highest speed, in accumulator units per tick.
    pub speed_ceiling: u64,

    /// Lowest speed while decelerating, in accumulator units per tick.
    pub speed_floor: u64,

    /// Position at which deceleration begins.
    pub decel_at: i32,

    /// Steps needed to reach the speed ceiling from rest.
    pub accel_distance: u32,

    /// True when the move is too short to reach the speed ceiling.
    pub triangular: bool,

    /// Effective speed after clamping.
    pub speed: StepsPerSec,

    /// Effective acceleration after clamping.
    pub accel: StepsPerSecSquared,
}

impl Profile {
    /// Create a zero-length profile (no motion) at `position`.
    pub const fn zero(position: i32) -> Self {
        Self {
            target: position,
            direction: Direction::Forward,
            distance: 0,
            accel_per_tick: 1,
            speed_ceiling: 0,
            speed_floor: 1,
            decel_at: position,
            accel_distance: 0,
            triangular: true,
            speed: StepsPerSec(0),
            accel: StepsPerSecSquared(0),
        }
    }

    /// Check if this is a zero-length profile.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.distance == 0
    }

    /// Whether `position` has reached the deceleration trigger.
    #[inline]
    pub fn decel_reached(&self, position: i32) -> bool {
        match self.direction {
            Direction::Forward => position >= self.decel_at,
            Direction::Reverse => position <= self.decel_at,
        }
    }

    /// Estimate total duration of the move in seconds.
    ///
    /// Uses the continuous-time profile; the clock's discrete execution
    /// differs by a few ticks.
    pub fn estimated_duration_secs(&self) -> f32 {
        if self.is_zero() || self.accel.0 == 0 || self.speed.0 == 0 {
            return 0.0;
        }

        let accel = self.accel.0 as f32;
        let distance = self.distance as f32;

        if self.triangular {
            // d/2 = a·t²/2 on each half
            2.0 * sqrtf(distance / accel)
        } else {
            let speed = self.speed.0 as f32;
            let cruise = distance - 2.0 * self.accel_distance as f32;
            2.0 * speed / accel + cruise / speed
        }
    }
}

/// Plan a trapezoidal move from `current` to `request.target`.
///
/// Speed and acceleration are clamped to `limits` (and speed to what the
/// clock can produce). A request to the current position yields
/// [`Profile::zero`].
///
/// # Errors
///
/// Zero speed or zero acceleration requests are rejected; callers resolve
/// "not provided" to the configured defaults before planning.
pub fn plan_move(
    current: i32,
    request: &MotionRequest,
    limits: &SystemLimits,
    timing: &ClockTiming,
) -> Result<Profile, MotionError> {
    if request.speed.0 == 0 {
        return Err(MotionError::ZeroSpeed);
    }
    if request.accel.0 == 0 {
        return Err(MotionError::ZeroAcceleration);
    }

    let speed = limits.clamp_speed(request.speed).min(timing.max_speed());
    let accel = limits.clamp_accel(request.accel);

    let delta = request.target as i64 - current as i64;
    if delta == 0 {
        return Ok(Profile::zero(current));
    }

    let direction = Direction::from_steps(delta);
    let distance = delta.unsigned_abs();

    let accel_per_tick = timing.accel_per_tick(accel);
    let speed_ceiling = timing.speed_per_tick(speed).max(1);

    // v² / 2a, from the truncated per-tick constants the clock ramps with
    let accel_distance = stopping_distance(speed_ceiling, accel_per_tick);

    let triangular = 2 * accel_distance >= distance;
    let decel_at = if triangular {
        direction.offset(current, distance / 2)
    } else {
        direction.reversed().offset(request.target, accel_distance)
    };

    // Speed after one step from rest, √(2a): keeps the last steps of a
    // deceleration from crawling at a single increment per tick.
    let start_speed = StepsPerSec(sqrtf(2.0 * accel.0 as f32) as u32);
    let speed_floor = timing
        .speed_per_tick(start_speed)
        .max(accel_per_tick)
        .min(speed_ceiling);

    Ok(Profile {
        target: request.target,
        direction,
        distance: distance.min(u32::MAX as u64) as u32,
        accel_per_tick,
        speed_ceiling,
        speed_floor,
        decel_at,
        accel_distance: accel_distance.min(u32::MAX as u64) as u32,
        triangular,
        speed,
        accel,
    })
}

/// Steps needed to decelerate from `speed` at `accel_per_tick`, both in
/// accumulator units. Always at least one.
pub fn stopping_distance(speed: u64, accel_per_tick: u64) -> u64 {
    if accel_per_tick == 0 {
        return 1;
    }
    let numerator = speed as u128 * speed as u128;
    let denominator = 2 * accel_per_tick as u128 * STEP_UNIT as u128;
    let steps = (numerator + denominator - 1) / denominator;
    (steps.min(u32::MAX as u128) as u64).max(1)
}
