//! Command module for stepper-axis.
//!
//! Provides the line parser, the console that runs commands against the
//! controller, and the start switch.

mod console;
mod parser;
mod switch;

pub use console::{Console, HELP, PROMPT};
pub use parser::{atoi, parse, Command};
pub use switch::{StartSwitch, RELEASE_POLLS};
