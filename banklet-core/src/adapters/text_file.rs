//! Plain text file record store
//!
//! One record per line, UTF-8, `\n` terminated. Writes take an advisory
//! exclusive lock on the target file for their duration.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::RecordStore;

/// Record store backed by files on the local filesystem
#[derive(Debug, Default, Clone)]
pub struct TextFileStore;

impl TextFileStore {
    pub fn new() -> Self {
        Self
    }

    fn create_parent_dir(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    fn is_missing_or_empty(path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e),
        }
    }

    fn write_locked(file: &mut File, lines: &[&str]) -> io::Result<()> {
        file.lock_exclusive()?;
        let result = (|| {
            for line in lines {
                writeln!(file, "{}", line)?;
            }
            file.flush()
        })();
        file.unlock()?;
        result
    }

    fn read_lines(path: &Path) -> io::Result<Vec<String>> {
        let file = File::open(path)?;
        BufReader::new(file).lines().collect()
    }

    fn rewrite_atomic(path: &Path, lines: &[String]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        for line in lines {
            writeln!(temp, "{}", line)?;
        }
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Log an I/O failure and convert it to the core error type
fn io_failure(op: &str, path: &Path, err: io::Error) -> Error {
    tracing::error!(path = %path.display(), error = %err, "record store {} failed", op);
    Error::Io(err)
}

impl RecordStore for TextFileStore {
    fn ensure_initialized(&self, path: &Path, header: &str) -> Result<()> {
        let needs_header =
            Self::is_missing_or_empty(path).map_err(|e| io_failure("initialize", path, e))?;
        if !needs_header {
            return Ok(());
        }

        Self::create_parent_dir(path).map_err(|e| io_failure("initialize", path, e))?;
        self.overwrite(path, header)?;
        tracing::debug!(path = %path.display(), "initialized record file with header");
        Ok(())
    }

    fn read_all(&self, path: &Path) -> Result<Vec<String>> {
        match Self::read_lines(path) {
            Ok(lines) => Ok(lines),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "record file not found");
                Err(Error::not_found(path.display().to_string()))
            }
            Err(e) => Err(io_failure("read", path, e)),
        }
    }

    fn append(&self, path: &Path, line: &str) -> Result<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| Self::write_locked(&mut file, &[line]))
            .map_err(|e| io_failure("append", path, e))
    }

    fn overwrite(&self, path: &Path, line: &str) -> Result<()> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .and_then(|mut file| {
                file.lock_exclusive()?;
                file.set_len(0)?;
                file.unlock()?;
                Self::write_locked(&mut file, &[line])
            })
            .map_err(|e| io_failure("overwrite", path, e))
    }

    fn rewrite(&self, path: &Path, lines: &[String]) -> Result<()> {
        Self::rewrite_atomic(path, lines).map_err(|e| io_failure("rewrite", path, e))
    }
}
