//! Motion module for stepper-axis.
//!
//! Provides trapezoidal profile planning and the fixed-point step clock
//! that executes it.

mod clock;
mod profile;
mod shared;

pub use clock::{ArmCommand, ClockEvent, ClockSnapshot, StepClock, Tick};
pub use profile::{plan_move, stopping_distance, Direction, MotionPhase, MotionRequest, Profile};
pub use shared::SharedClock;
