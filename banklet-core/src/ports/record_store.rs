//! Record store port - line-oriented persistence abstraction

use std::path::Path;

use crate::domain::result::Result;

/// Line-oriented storage with a mandatory header line
///
/// Lines are passed and returned without their terminator. Implementations
/// (adapters) decide where the bytes actually live.
pub trait RecordStore: Send + Sync {
    /// Create the file with `header` as its sole line if it is missing or empty.
    /// A non-empty file is left untouched.
    fn ensure_initialized(&self, path: &Path, header: &str) -> Result<()>;

    /// All lines in order, header included.
    /// A missing file is `Error::NotFound`, never an empty vector.
    fn read_all(&self, path: &Path) -> Result<Vec<String>>;

    /// Append one line
    fn append(&self, path: &Path, line: &str) -> Result<()>;

    /// Truncate the file and write a single line
    fn overwrite(&self, path: &Path, line: &str) -> Result<()>;

    /// Replace the whole file with `lines`
    fn rewrite(&self, path: &Path, lines: &[String]) -> Result<()>;
}
