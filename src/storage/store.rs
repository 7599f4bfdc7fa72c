//! Storage backends for the settings record.

use crate::error::StorageError;

use super::record::MAX_RECORD_SIZE;

/// A medium that holds one settings block.
///
/// Implementations write the whole block at once; a partial write must
/// either fail or leave something the record checks will reject.
pub trait SettingsStore {
    /// Read the stored block into `buffer`, returning its length.
    ///
    /// Returns `StorageError::NotFound` when nothing has been written.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the stored block.
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;
}

/// RAM-backed store, for tests and boards without non-volatile memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<heapless::Vec<u8, MAX_RECORD_SIZE>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// Raw stored bytes, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Overwrite the stored bytes directly.
    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        let data = heapless::Vec::from_slice(bytes).map_err(|_| StorageError::Encoding)?;
        self.data = Some(data);
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.data.as_ref().ok_or(StorageError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::Encoding)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        self.set_bytes(data)
    }
}

/// File-backed store (std only).
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "std")]
impl FileStore {
    /// Store the block at `path`.
    pub fn new<P: Into<std::path::PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "std")]
impl SettingsStore for FileStore {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound,
            _ => StorageError::Io,
        })?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::Encoding)?;
        target.copy_from_slice(&data);
        Ok(data.len())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        // write aside then rename so a crash never leaves half a record
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data).map_err(|_| StorageError::Io)?;
        std::fs::rename(&tmp, &self.path).map_err(|_| StorageError::Io)
    }
}
