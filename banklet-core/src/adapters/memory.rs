//! In-memory record store for tests and dry runs

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::ports::RecordStore;

/// Record store that keeps every "file" as a vector of lines
///
/// `fail_writes(true)` makes every mutating call return an I/O error,
/// which lets callers exercise their failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<String>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated write failures
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw content of a file, if present
    pub fn contents(&self, path: &Path) -> Option<Vec<String>> {
        self.files().ok()?.get(path).cloned()
    }

    /// Seed a file with the given lines
    pub fn insert(&self, path: impl Into<PathBuf>, lines: Vec<String>) -> Result<()> {
        self.files()?.insert(path.into(), lines);
        Ok(())
    }

    fn files(&self) -> Result<MutexGuard<'_, HashMap<PathBuf, Vec<String>>>> {
        self.files
            .lock()
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, format!("lock poisoned: {e}"))))
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            tracing::error!(path = %path.display(), "simulated write failure");
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("writes disabled for {}", path.display()),
            )));
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn ensure_initialized(&self, path: &Path, header: &str) -> Result<()> {
        let needs_header = self.files()?.get(path).map_or(true, |lines| lines.is_empty());
        if needs_header {
            self.overwrite(path, header)?;
        }
        Ok(())
    }

    fn read_all(&self, path: &Path) -> Result<Vec<String>> {
        self.files()?
            .get(path)
            .cloned()
            .ok_or_else(|| Error::not_found(path.display().to_string()))
    }

    fn append(&self, path: &Path, line: &str) -> Result<()> {
        self.check_writable(path)?;
        self.files()?
            .entry(path.to_path_buf())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    fn overwrite(&self, path: &Path, line: &str) -> Result<()> {
        self.check_writable(path)?;
        self.files()?.insert(path.to_path_buf(), vec![line.to_string()]);
        Ok(())
    }

    fn rewrite(&self, path: &Path, lines: &[String]) -> Result<()> {
        self.check_writable(path)?;
        self.files()?.insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }
}
