//! Command line parser.
//!
//! A line is a one-letter verb (case-insensitive) followed by integers
//! separated by spaces. Numbers parse the way C `atoi` does: a malformed
//! token is 0, and 0 in a speed or acceleration slot means "use the
//! default".

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::error::{CommandError, MotorError, Result};
use crate::motion::Direction;
use crate::program::RawEntry;

/// Most arguments any command takes.
const MAX_ARGS: usize = 4;

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `0`: make the current position the origin.
    SetOrigin,
    /// `S`: stop immediately and abandon any program.
    Stop,
    /// `D`: disable the driver output.
    Disable,
    /// `E`: enable the driver output.
    Enable,
    /// `H [speed] [accel]`: move to position 0.
    Home {
        /// Speed override.
        speed: Option<StepsPerSec>,
        /// Acceleration override.
        accel: Option<StepsPerSecSquared>,
    },
    /// `M dest [speed] [accel]`: move to an absolute position.
    Move {
        /// Target position.
        destination: i32,
        /// Speed override.
        speed: Option<StepsPerSec>,
        /// Acceleration override.
        accel: Option<StepsPerSecSquared>,
    },
    /// `J [±1] [speed]`: jog, or with no direction decelerate to a stop.
    Jog {
        /// Direction to jog in, `None` to stop.
        direction: Option<Direction>,
        /// Speed override.
        speed: Option<StepsPerSec>,
    },
    /// `I`: report position and limits.
    Info,
    /// `G`: run the stored program.
    Go,
    /// `P`: print the stored program.
    Print,
    /// `C`: clear the stored program.
    Clear,
    /// `L line dest rate accel`: write one program line.
    SetLine {
        /// Line number, checked against the table.
        line: i32,
        /// Raw triple, checked against the entry rules.
        entry: RawEntry,
    },
    /// `R value`: set the maximum speed.
    SetMaxSpeed(i32),
    /// `A value`: set the maximum acceleration.
    SetMaxAccel(i32),
    /// `V`: save settings.
    Save,
    /// `?`: print help.
    Help,
}

/// Parse an integer like C `atoi`.
///
/// Leading whitespace and a sign are accepted, then digits up to the first
/// non-digit. No digits gives 0. Out-of-range values saturate.
pub fn atoi(token: &str) -> i32 {
    let token = token.trim_start();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + (byte - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Parse one line. Blank lines give `None`.
///
/// # Errors
///
/// Unknown verbs, a missing required argument and negative speeds or
/// accelerations are reported.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let mut chars = line.chars();
    let verb = match chars.next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return Ok(None),
    };

    let mut args: heapless::Vec<i32, MAX_ARGS> = heapless::Vec::new();
    for token in chars.as_str().split_whitespace() {
        if args.push(atoi(token)).is_err() {
            break;
        }
    }
    let arg = |i: usize| args.get(i).copied();

    let command = match verb {
        '0' => Command::SetOrigin,
        'S' => Command::Stop,
        'D' => Command::Disable,
        'E' => Command::Enable,
        'H' => Command::Home {
            speed: speed_arg(arg(0))?,
            accel: accel_arg(arg(1))?,
        },
        'M' => Command::Move {
            destination: arg(0).ok_or(CommandError::MissingArgument('M'))?,
            speed: speed_arg(arg(1))?,
            accel: accel_arg(arg(2))?,
        },
        'J' => Command::Jog {
            direction: match arg(0).unwrap_or(0) {
                0 => None,
                d if d > 0 => Some(Direction::Forward),
                _ => Some(Direction::Reverse),
            },
            speed: speed_arg(arg(1))?,
        },
        'I' => Command::Info,
        'G' => Command::Go,
        'P' => Command::Print,
        'C' => Command::Clear,
        'L' => Command::SetLine {
            line: arg(0).ok_or(CommandError::MissingArgument('L'))?,
            entry: RawEntry::new(
                arg(1).unwrap_or(0),
                arg(2).unwrap_or(0),
                arg(3).unwrap_or(0),
            ),
        },
        'R' => Command::SetMaxSpeed(arg(0).unwrap_or(0)),
        'A' => Command::SetMaxAccel(arg(0).unwrap_or(0)),
        'V' => Command::Save,
        '?' => Command::Help,
        other => return Err(CommandError::Unknown(other).into()),
    };

    Ok(Some(command))
}

fn speed_arg(value: Option<i32>) -> core::result::Result<Option<StepsPerSec>, MotorError> {
    match value.unwrap_or(0) {
        0 => Ok(None),
        v if v > 0 => Ok(Some(StepsPerSec(v as u32))),
        v => Err(MotorError::InvalidSpeed(v)),
    }
}

fn accel_arg(value: Option<i32>) -> core::result::Result<Option<StepsPerSecSquared>, MotorError> {
    match value.unwrap_or(0) {
        0 => Ok(None),
        v if v > 0 => Ok(Some(StepsPerSecSquared(v as u32))),
        v => Err(MotorError::InvalidAccel(v)),
    }
}
