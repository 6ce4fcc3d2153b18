//! Durable storage backends.
//!
//! The [`Storage`] trait is the port the [`Store`](crate::Store) reads and
//! writes through. It deals in whole documents only: there is no partial
//! read and no partial write.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{Error, Result};

/// Whole-document storage port.
pub trait Storage: Send + Sync {
    /// Read the full persisted document, or `None` if nothing was ever written.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the persisted document.
    fn write(&self, contents: &str) -> Result<()>;
}

/// A single JSON file on disk.
///
/// Writes truncate and rewrite the file in place. There is no temporary
/// file and no rename, so a crash mid-write can leave a partial document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        debug!("Writing {} bytes to {}", contents.len(), self.path.display());
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// In-process storage standing in for a file in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with an existing document.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        let guard = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut guard = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(contents.to_string());
        Ok(())
    }
}
