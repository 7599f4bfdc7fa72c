//! Fixed-capacity move program table.

use core::fmt;

use crate::error::{ProgramError, Result};

use super::entry::{ProgramEntry, RawEntry};

/// Number of lines in the program table.
pub const PROGRAM_CAPACITY: usize = 24;

/// Ordered table of program lines.
///
/// Lines are edited individually and may be changed while a program runs;
/// an edit is picked up when the sequencer next reaches that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTable {
    entries: [ProgramEntry; PROGRAM_CAPACITY],
}

impl Default for ProgramTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramTable {
    /// Create an empty table (every line is the end marker).
    pub const fn new() -> Self {
        Self {
            entries: [ProgramEntry::End; PROGRAM_CAPACITY],
        }
    }

    /// Build a table from raw lines, starting at line 0.
    ///
    /// # Errors
    ///
    /// Returns an error if there are more lines than the table holds or a
    /// line is not a valid entry.
    pub fn from_raw(lines: &[RawEntry]) -> Result<Self> {
        if lines.len() > PROGRAM_CAPACITY {
            return Err(ProgramError::InvalidLine(lines.len() as i32 - 1).into());
        }
        let mut table = Self::new();
        for (slot, raw) in table.entries.iter_mut().zip(lines) {
            *slot = ProgramEntry::from_raw(*raw)?;
        }
        Ok(table)
    }

    /// Raw form of every line, for persistence.
    pub fn to_raw(&self) -> [RawEntry; PROGRAM_CAPACITY] {
        let mut raw = [RawEntry::default(); PROGRAM_CAPACITY];
        for (slot, entry) in raw.iter_mut().zip(self.entries.iter()) {
            *slot = entry.to_raw();
        }
        raw
    }

    /// Write one line from its raw triple.
    ///
    /// # Errors
    ///
    /// `ProgramError::InvalidLine` when `line` is negative or not below
    /// [`PROGRAM_CAPACITY`], `ProgramError::InvalidEntry` when the triple is
    /// meaningless.
    pub fn set_line(&mut self, line: i32, raw: RawEntry) -> Result<ProgramEntry> {
        let index = Self::index(line)?;
        let entry = ProgramEntry::from_raw(raw)?;
        self.entries[index] = entry;
        Ok(entry)
    }

    /// Get a line, `None` past the end of the table.
    #[inline]
    pub fn get(&self, index: usize) -> Option<ProgramEntry> {
        self.entries.get(index).copied()
    }

    /// Reset every line to the end marker.
    pub fn clear(&mut self) {
        self.entries = [ProgramEntry::End; PROGRAM_CAPACITY];
    }

    /// Check whether the program ends before its first line.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries[0].is_end()
    }

    /// Number of lines before the first end marker.
    pub fn len(&self) -> usize {
        self.active().count()
    }

    /// Iterate over the lines that would run, with their indices.
    pub fn active(&self) -> impl Iterator<Item = (usize, ProgramEntry)> + '_ {
        self.entries
            .iter()
            .copied()
            .enumerate()
            .take_while(|(_, entry)| !entry.is_end())
    }

    /// Write the program as `L` commands that reproduce it, or `No program`.
    pub fn write_listing<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        if self.is_empty() {
            return writeln!(out, "No program");
        }
        for (index, entry) in self.active() {
            let raw = entry.to_raw();
            writeln!(
                out,
                "L {} {} {} {}   ; {}",
                index, raw.destination, raw.rate, raw.accel, entry
            )?;
        }
        Ok(())
    }

    fn index(line: i32) -> core::result::Result<usize, ProgramError> {
        if line < 0 || line as usize >= PROGRAM_CAPACITY {
            return Err(ProgramError::InvalidLine(line));
        }
        Ok(line as usize)
    }
}
