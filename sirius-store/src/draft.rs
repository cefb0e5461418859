use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::StoreError;

/// One named slot holding a serialized form snapshot.
///
/// Writes replace the whole value and the last write wins. Callers own the
/// serialization format; the slot only moves text.
pub trait DraftSlot: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>, StoreError>;

    fn write(&self, contents: &str) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Draft slot backed by a single file on local disk
#[derive(Debug, Clone)]
pub struct FileDraftSlot {
    path: PathBuf,
}

impl FileDraftSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl DraftSlot for FileDraftSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write beside the slot and rename so a crash never leaves half a draft.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), bytes = contents.len(), "Draft slot written");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Draft slot cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local slot, used by tests and as a fallback when no disk is configured
#[derive(Debug, Default)]
pub struct MemoryDraftSlot {
    contents: Mutex<Option<String>>,
}

impl MemoryDraftSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `contents`, e.g. a corrupted draft in tests.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }
}

impl DraftSlot for MemoryDraftSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let guard = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        let mut guard = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}
