//! Program entries.
//!
//! An entry is decided when the line is edited, not when it runs: the raw
//! `(destination, rate, accel)` triple typed at the console or stored in
//! flash is turned into a [`ProgramEntry`] once, and everything downstream
//! matches on the variant.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::error::ProgramError;

/// Raw program line as typed (`L line dest rate accel`) or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawEntry {
    /// Destination position, or dwell time in ms when `rate` is zero.
    pub destination: i32,
    /// Speed in steps/sec; zero marks a dwell or the end of the program.
    pub rate: i32,
    /// Acceleration in steps/sec²; zero means "use the system maximum".
    #[serde(default)]
    pub accel: i32,
}

impl RawEntry {
    /// Create a raw entry.
    pub const fn new(destination: i32, rate: i32, accel: i32) -> Self {
        Self {
            destination,
            rate,
            accel,
        }
    }
}

/// One line of the move program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramEntry {
    /// Move to an absolute position.
    Move {
        /// Target position in steps.
        destination: i32,
        /// Requested speed.
        speed: StepsPerSec,
        /// Requested acceleration, `None` for the system maximum.
        accel: Option<StepsPerSecSquared>,
    },
    /// Pause without motion.
    Dwell {
        /// Pause length in milliseconds.
        millis: u32,
    },
    /// End of program marker.
    #[default]
    End,
}

impl ProgramEntry {
    /// Decide what a raw triple means.
    ///
    /// # Errors
    ///
    /// Negative rates, negative accelerations and negative dwell times are
    /// rejected with `ProgramError::InvalidEntry`.
    pub fn from_raw(raw: RawEntry) -> Result<Self, ProgramError> {
        let invalid = ProgramError::InvalidEntry {
            destination: raw.destination,
            rate: raw.rate,
            accel: raw.accel,
        };

        match (raw.destination, raw.rate) {
            (0, 0) => Ok(ProgramEntry::End),
            (millis, 0) if millis > 0 => Ok(ProgramEntry::Dwell {
                millis: millis as u32,
            }),
            (destination, rate) if rate > 0 => {
                if raw.accel < 0 {
                    return Err(invalid);
                }
                Ok(ProgramEntry::Move {
                    destination,
                    speed: StepsPerSec(rate as u32),
                    accel: (raw.accel > 0).then_some(StepsPerSecSquared(raw.accel as u32)),
                })
            }
            _ => Err(invalid),
        }
    }

    /// Raw triple for persistence and listings.
    pub fn to_raw(&self) -> RawEntry {
        match *self {
            ProgramEntry::Move {
                destination,
                speed,
                accel,
            } => RawEntry::new(
                destination,
                speed.0.min(i32::MAX as u32) as i32,
                accel.map_or(0, |a| a.0.min(i32::MAX as u32) as i32),
            ),
            ProgramEntry::Dwell { millis } => {
                RawEntry::new(millis.min(i32::MAX as u32) as i32, 0, 0)
            }
            ProgramEntry::End => RawEntry::default(),
        }
    }

    /// Check for the end marker.
    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self, ProgramEntry::End)
    }
}

impl TryFrom<RawEntry> for ProgramEntry {
    type Error = ProgramError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl fmt::Display for ProgramEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramEntry::Move {
                destination,
                speed,
                accel: Some(accel),
            } => write!(f, "move to {} at {} accel {}", destination, speed.0, accel.0),
            ProgramEntry::Move {
                destination,
                speed,
                accel: None,
            } => write!(f, "move to {} at {}", destination, speed.0),
            ProgramEntry::Dwell { millis } => write!(f, "dwell {} ms", millis),
            ProgramEntry::End => write!(f, "end"),
        }
    }
}
