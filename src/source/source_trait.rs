//! Trait abstraction for table reads to enable testing

use std::path::{Path, PathBuf};

use super::{read_all, CsvTable};
use crate::error::Result;

/// Anything that can produce a fresh telemetry table on demand
#[cfg_attr(test, mockall::automock)]
pub trait TableSource {
    /// Read every row, with incomplete columns already dropped
    fn read_all(&self) -> Result<CsvTable>;

    /// Where the table comes from, for error messages
    fn origin(&self) -> PathBuf;
}

/// CSV file on disk, re-read on every call
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvFileSource {
    fn read_all(&self) -> Result<CsvTable> {
        read_all(&self.path)
    }

    fn origin(&self) -> PathBuf {
        self.path.clone()
    }
}
