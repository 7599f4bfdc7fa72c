//! Settings persistence.
//!
//! Loads and saves limits and the move program as one validated record.
//! Loading never fails outright: anything wrong with the stored block
//! falls back to defaults and the reason is reported alongside.

mod record;
mod store;

pub use record::{Settings, SettingsRecord, MAX_RECORD_SIZE, SETTINGS_MAGIC, SETTINGS_VERSION};
#[cfg(feature = "std")]
pub use store::FileStore;
pub use store::{MemoryStore, SettingsStore};

use crate::error::StorageError;

/// Result of [`load_settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    /// Settings to run with.
    pub settings: Settings,
    /// Why the stored record was not used, if it wasn't.
    pub fallback: Option<StorageError>,
}

/// Load settings, or fall back to `defaults`.
pub fn load_settings<S: SettingsStore>(store: &mut S, defaults: Settings) -> LoadedSettings {
    match read_settings(store) {
        Ok(settings) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("Loaded settings from storage");
            LoadedSettings {
                settings,
                fallback: None,
            }
        }
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to load settings: {:?}, using defaults", e);
            LoadedSettings {
                settings: defaults,
                fallback: Some(e),
            }
        }
    }
}

/// Read and validate the stored record.
///
/// # Errors
///
/// Returns the storage, decoding or validation failure.
pub fn read_settings<S: SettingsStore>(store: &mut S) -> Result<Settings, StorageError> {
    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let len = store.read(&mut buffer)?;
    SettingsRecord::decode(&buffer[..len])?.validate()
}

/// Encode `settings` and write them as one block.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn save_settings<S: SettingsStore>(store: &mut S, settings: &Settings) -> Result<(), StorageError> {
    let record = SettingsRecord::from_settings(settings);
    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let bytes = record.encode(&mut buffer)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("Saving {} bytes of settings", bytes.len());

    store.write(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemLimits;
    use crate::program::{ProgramTable, RawEntry};

    #[test]
    fn test_empty_store_falls_back() {
        let mut store = MemoryStore::new();
        let loaded = load_settings(&mut store, Settings::default());
        assert_eq!(loaded.settings, Settings::default());
        assert_eq!(loaded.fallback, Some(StorageError::NotFound));
    }

    #[test]
    fn test_save_then_load() {
        let mut program = ProgramTable::new();
        program.set_line(0, RawEntry::new(-300, 900, 0)).unwrap();
        let settings = Settings {
            limits: SystemLimits::new(1000, 800).unwrap(),
            program,
        };

        let mut store = MemoryStore::new();
        save_settings(&mut store, &settings).unwrap();

        let loaded = load_settings(&mut store, Settings::default());
        assert_eq!(loaded.fallback, None);
        assert_eq!(loaded.settings, settings);
    }

    #[test]
    fn test_garbage_falls_back() {
        let mut store = MemoryStore::new();
        store.set_bytes(&[0xAB; 40]).unwrap();
        let loaded = load_settings(&mut store, Settings::default());
        assert_eq!(loaded.settings, Settings::default());
        assert!(loaded.fallback.is_some());
    }
}
