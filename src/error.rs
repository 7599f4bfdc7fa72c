//! Error types for stepper-axis.
//!
//! Provides unified error handling across configuration, planning, the motion
//! state machine, the move program, settings storage and the command console.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-axis operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motion planning error
    Motion(MotionError),
    /// Motion state machine / driver error
    Motor(MotorError),
    /// Move-program editing or sequencing error
    Program(ProgramError),
    /// Settings storage error
    Storage(StorageError),
    /// Command line error
    Command(CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Tick rate must be > 0
    InvalidTickRate(u32),
    /// Max speed must be > 0
    InvalidMaxSpeed(i32),
    /// Max acceleration must be > 0
    InvalidMaxAccel(i32),
    /// Max speed cannot be reached with the configured tick rate
    SpeedAboveTickBound {
        /// Requested max speed in steps/sec
        speed: u32,
        /// Highest speed the clock can produce
        bound: u32,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion planning errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// A move was requested with zero speed
    ZeroSpeed,
    /// A move was requested with zero acceleration
    ZeroAcceleration,
}

/// Motion state machine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// A motion is already in progress
    Busy,
    /// Requested speed is negative
    InvalidSpeed(i32),
    /// Requested acceleration is negative
    InvalidAccel(i32),
}

/// Move-program errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramError {
    /// Line number is outside the table
    InvalidLine(i32),
    /// Entry triple does not describe a move, a dwell or the end marker
    InvalidEntry {
        /// Destination (or dwell duration) field
        destination: i32,
        /// Rate field
        rate: i32,
        /// Acceleration field
        accel: i32,
    },
    /// Program table holds no entries
    Empty,
}

/// Settings storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying medium failed to read or write
    Io,
    /// No record has been written yet
    NotFound,
    /// Record could not be encoded or decoded
    Encoding,
    /// Record magic does not match
    BadMagic(u32),
    /// Record was written by an unsupported format version
    UnsupportedVersion(u8),
    /// Stored checksum does not match the contents
    ChecksumMismatch {
        /// Checksum stored in the record
        stored: u32,
        /// Checksum computed over the record contents
        computed: u32,
    },
    /// Record decoded but its contents are not valid settings
    InvalidContents,
}

/// Command line errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Verb is not recognised
    Unknown(char),
    /// A required argument is missing
    MissingArgument(char),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motion(e) => write!(f, "{}", e),
            Error::Motor(e) => write!(f, "{}", e),
            Error::Program(e) => write!(f, "{}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
            Error::Command(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidTickRate(v) => write!(f, "Invalid tick rate: {}. Must be > 0", v),
            ConfigError::InvalidMaxSpeed(v) => write!(f, "Invalid max speed: {}. Must be > 0", v),
            ConfigError::InvalidMaxAccel(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            ConfigError::SpeedAboveTickBound { speed, bound } => {
                write!(f, "Max speed {} exceeds clock bound {}", speed, bound)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::ZeroSpeed => write!(f, "Speed must be > 0"),
            MotionError::ZeroAcceleration => write!(f, "Acceleration must be > 0"),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::Busy => write!(f, "Busy, stop first"),
            MotorError::InvalidSpeed(v) => write!(f, "Invalid speed: {}", v),
            MotorError::InvalidAccel(v) => write!(f, "Invalid acceleration: {}", v),
        }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::InvalidLine(line) => write!(f, "Invalid line number: {}", line),
            ProgramError::InvalidEntry {
                destination,
                rate,
                accel,
            } => write!(f, "Invalid program line: {} {} {}", destination, rate, accel),
            ProgramError::Empty => write!(f, "No program"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io => write!(f, "storage I/O failed"),
            StorageError::NotFound => write!(f, "no saved settings"),
            StorageError::Encoding => write!(f, "settings record could not be encoded"),
            StorageError::BadMagic(m) => write!(f, "bad record magic {:#010x}", m),
            StorageError::UnsupportedVersion(v) => write!(f, "unsupported record version {}", v),
            StorageError::ChecksumMismatch { stored, computed } => {
                write!(f, "checksum mismatch (stored {:#010x}, computed {:#010x})", stored, computed)
            }
            StorageError::InvalidContents => write!(f, "saved settings are invalid"),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(_) => write!(f, "Unknown command"),
            CommandError::MissingArgument(verb) => write!(f, "Missing argument for {}", verb),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<ProgramError> for Error {
    fn from(e: ProgramError) -> Self {
        Error::Program(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for ProgramError {}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}
