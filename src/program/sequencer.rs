//! Move-program sequencer.

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::config::ClockTiming;

use super::entry::ProgramEntry;
use super::table::{ProgramTable, PROGRAM_CAPACITY};

/// What the state machine should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NextAction {
    /// Move to a destination.
    Move {
        /// Line this action came from.
        line: usize,
        /// Target position in steps.
        destination: i32,
        /// Requested speed.
        speed: StepsPerSec,
        /// Requested acceleration, `None` for the system maximum.
        accel: Option<StepsPerSecSquared>,
    },
    /// Wait without motion.
    Dwell {
        /// Line this action came from.
        line: usize,
        /// Dwell length in clock ticks.
        ticks: u64,
    },
    /// Program finished (end marker or end of table).
    EndOfProgram,
}

/// Walks the program table one line at a time.
///
/// The sequencer only holds the cursor; the table is passed in on every
/// call so edits made between steps are seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequencer {
    index: usize,
    running: bool,
}

impl Sequencer {
    /// Create an idle sequencer.
    pub const fn new() -> Self {
        Self {
            index: 0,
            running: false,
        }
    }

    /// Rewind to line 0 and mark the program running.
    pub fn start(&mut self) {
        self.index = 0;
        self.running = true;
    }

    /// Abandon the program.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether a program is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read the current line and advance.
    ///
    /// Returns `EndOfProgram` (and stops) on the end marker, past the last
    /// line, or when no program is running.
    pub fn next(&mut self, table: &ProgramTable, timing: &ClockTiming) -> NextAction {
        if !self.running || self.index >= PROGRAM_CAPACITY {
            self.running = false;
            return NextAction::EndOfProgram;
        }

        let line = self.index;
        self.index += 1;

        match table.get(line).unwrap_or(ProgramEntry::End) {
            ProgramEntry::Move {
                destination,
                speed,
                accel,
            } => NextAction::Move {
                line,
                destination,
                speed,
                accel,
            },
            ProgramEntry::Dwell { millis } => NextAction::Dwell {
                line,
                ticks: timing.millis_to_ticks(millis),
            },
            ProgramEntry::End => {
                self.running = false;
                NextAction::EndOfProgram
            }
        }
    }
}
