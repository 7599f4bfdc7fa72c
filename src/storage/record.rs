//! Persisted settings record.
//!
//! Limits and the program table are stored together as one postcard-encoded
//! block, with a header for validation and a CRC over the contents.

use serde::{Deserialize, Serialize};

use crate::config::SystemLimits;
use crate::error::StorageError;
use crate::program::{ProgramTable, RawEntry, PROGRAM_CAPACITY};

/// Magic number to identify a settings record ("STPX").
pub const SETTINGS_MAGIC: u32 = 0x5354_5058;

/// Current settings record version.
pub const SETTINGS_VERSION: u8 = 1;

/// Upper bound on the encoded record size.
pub const MAX_RECORD_SIZE: usize = 512;

/// Settings that survive a power cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Speed and acceleration limits.
    pub limits: SystemLimits,
    /// Stored move program.
    pub program: ProgramTable,
}

/// On-storage form of [`Settings`].
///
/// Fields are raw integers so a record from a damaged or foreign source can
/// be decoded and then rejected field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Maximum speed in steps/sec
    pub max_speed: i32,
    /// Maximum acceleration in steps/sec²
    pub max_accel: i32,
    /// Program lines
    pub program: [RawEntry; PROGRAM_CAPACITY],
    /// CRC32 checksum (calculated over magic..program)
    pub crc: u32,
}

impl SettingsRecord {
    /// Build a record, with its CRC, from live settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let (max_speed, max_accel) = settings.limits.to_raw();
        let mut record = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            max_speed,
            max_accel,
            program: settings.program.to_raw(),
            crc: 0,
        };
        record.update_crc();
        record
    }

    /// Check the header, the checksum and every field, and convert.
    ///
    /// # Errors
    ///
    /// Returns the first check that failed. Nothing from a rejected record
    /// should be used.
    pub fn validate(&self) -> Result<Settings, StorageError> {
        if self.magic != SETTINGS_MAGIC {
            return Err(StorageError::BadMagic(self.magic));
        }
        if self.version != SETTINGS_VERSION {
            return Err(StorageError::UnsupportedVersion(self.version));
        }
        let computed = self.calculate_crc();
        if self.crc != computed {
            return Err(StorageError::ChecksumMismatch {
                stored: self.crc,
                computed,
            });
        }

        let limits = SystemLimits::new(self.max_speed, self.max_accel)
            .map_err(|_| StorageError::InvalidContents)?;
        let program =
            ProgramTable::from_raw(&self.program).map_err(|_| StorageError::InvalidContents)?;

        Ok(Settings { limits, program })
    }

    /// Serialize into `buffer`, returning the used prefix.
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], StorageError> {
        postcard::to_slice(self, buffer).map_err(|_| StorageError::Encoding)
    }

    /// Deserialize a record. Does not validate it.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        postcard::from_bytes(bytes).map_err(|_| StorageError::Encoding)
    }

    /// Calculate CRC32 over everything but the crc field.
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.max_speed.to_le_bytes());
        crc = crc32_update(crc, &self.max_accel.to_le_bytes());

        for line in &self.program {
            crc = crc32_update(crc, &line.destination.to_le_bytes());
            crc = crc32_update(crc, &line.rate.to_le_bytes());
            crc = crc32_update(crc, &line.accel.to_le_bytes());
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        let mut program = ProgramTable::new();
        program.set_line(0, RawEntry::new(2000, 3000, 1500)).unwrap();
        program.set_line(1, RawEntry::new(100, 0, 0)).unwrap();
        Settings {
            limits: SystemLimits::new(3500, 1200).unwrap(),
            program,
        }
    }

    #[test]
    fn test_crc_known_value() {
        // standard CRC-32 check value
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_encode_decode_validate() {
        let record = SettingsRecord::from_settings(&sample());
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buffer).unwrap();

        let decoded = SettingsRecord::decode(bytes).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.validate().unwrap(), sample());
    }

    #[test]
    fn test_crc_detects_change() {
        let mut record = SettingsRecord::from_settings(&sample());
        assert_eq!(record.crc, record.calculate_crc());
        record.program[0].destination = 2001;
        assert_ne!(record.crc, record.calculate_crc());
        assert!(matches!(
            record.validate(),
            Err(StorageError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_header_checks() {
        let mut record = SettingsRecord::from_settings(&sample());
        record.magic = 0xFFFF_FFFF;
        record.update_crc();
        assert_eq!(record.validate(), Err(StorageError::BadMagic(0xFFFF_FFFF)));

        let mut record = SettingsRecord::from_settings(&sample());
        record.version = 9;
        record.update_crc();
        assert_eq!(record.validate(), Err(StorageError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_nonpositive_limits_rejected() {
        let mut record = SettingsRecord::from_settings(&sample());
        record.max_accel = 0;
        record.update_crc();
        assert_eq!(record.validate(), Err(StorageError::InvalidContents));
    }

    #[test]
    fn test_bad_program_line_rejected() {
        let mut record = SettingsRecord::from_settings(&sample());
        record.program[3] = RawEntry::new(100, -5, 0);
        record.update_crc();
        assert_eq!(record.validate(), Err(StorageError::InvalidContents));
    }

    #[test]
    fn test_erased_flash_is_not_a_record() {
        let erased = [0xFFu8; MAX_RECORD_SIZE];
        let result = SettingsRecord::decode(&erased).and_then(|r| r.validate().map(|_| ()));
        assert!(result.is_err());
    }
}
