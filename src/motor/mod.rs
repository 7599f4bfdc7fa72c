//! Motor module for stepper-axis.
//!
//! Provides the motion state machine and the STEP/DIR/ENABLE pin drivers.

mod controller;
mod driver;
mod state;

pub use controller::{MotionController, Notification, JOG_DISTANCE};
pub use driver::{DriverEnable, StepOutputs};
pub use state::MotionState;
