//! # stepper-axis
//!
//! Single-axis trapezoidal stepper controller with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Fixed-point step clock**: one add and one compare per tick, driven from
//!   a periodic timer interrupt
//! - **Trapezoidal profiles**: planned once per move, triangular when the
//!   move is too short to reach speed
//! - **Interrupt-safe hand-off**: the foreground arms the clock with one
//!   message inside a critical section
//! - **Move programs**: 24-line table of moves and dwells, editable while it
//!   runs
//! - **Line console**: one-letter commands over any `core::fmt::Write` sink
//! - **Validated persistence**: versioned, checksummed settings record
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_axis::{Console, ControllerConfig, DriverEnable, MotionController, SharedClock};
//!
//! static CLOCK: SharedClock = SharedClock::new();
//!
//! // In the timer interrupt:
//! let tick = CLOCK.tick();
//! step_outputs.apply(&tick)?;
//!
//! // In the foreground:
//! let config = ControllerConfig::default();
//! let controller = MotionController::new(&CLOCK, DriverEnable::new(en_pin, true), &config)?;
//! let mut console = Console::new(controller, store);
//! console.load()?;
//! loop {
//!     if let Some(line) = uart.read_line() {
//!         console.execute(line, &mut uart)?;
//!     }
//!     console.poll(&mut uart)?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML config loading and the file settings store
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod command;
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod program;
pub mod storage;

// Re-exports for ergonomic API
pub use command::{Command, Console, StartSwitch};
pub use config::{validate_config, ClockTiming, ControllerConfig, SystemLimits};
pub use error::{Error, Result};
pub use motion::{Direction, MotionPhase, Profile, SharedClock, StepClock, Tick};
pub use motor::{DriverEnable, MotionController, MotionState, Notification, StepOutputs};
pub use program::{ProgramEntry, ProgramTable, RawEntry, PROGRAM_CAPACITY};
pub use storage::{Settings, SettingsStore};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{StepsPerSec, StepsPerSecSquared};
