use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{SessionStore, SnapshotError};

/// One snapshot file on disk. Writes go through a sibling temp file and a
/// rename so a crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<String>, SnapshotError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::io(&self.path, e)),
        }
    }

    fn save(&self, snapshot: &str) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
        }

        let temp = self.temp_path();
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(snapshot.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&temp);
            SnapshotError::io(&self.path, e)
        })?;

        tracing::debug!(path = %self.path.display(), bytes = snapshot.len(), "session saved");
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(snapshot.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, SnapshotError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, snapshot: &str) -> Result<(), SnapshotError> {
        *self.slot.borrow_mut() = Some(snapshot.to_string());
        Ok(())
    }
}
