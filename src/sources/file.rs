//! File-based configuration source.

use super::ConfigSource;
use crate::error::{MonitorError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based configuration source.
///
/// Reads the whole document from disk on every fetch. Pairs with the
/// file trigger, which runs a pass whenever the file is rewritten.
///
/// # Examples
///
/// ```rust,no_run
/// use options_monitor::sources::FileSource;
///
/// let source = FileSource::new("/etc/app/options.json");
/// ```
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a new file source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn fetch(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| MonitorError::fetch_failed(self.name(), e))
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
