//! Program module for stepper-axis.
//!
//! Provides the stored move/dwell table and the sequencer that plays it back.

mod entry;
mod sequencer;
mod table;

pub use entry::{ProgramEntry, RawEntry};
pub use sequencer::{NextAction, Sequencer};
pub use table::{ProgramTable, PROGRAM_CAPACITY};
