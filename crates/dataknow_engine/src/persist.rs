//! Saving fetched reports to the local report directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("report directory {path:?} is unusable: {reason}")]
    ReportDir { path: PathBuf, reason: String },
    #[error("writing report failed: {0}")]
    Io(#[from] io::Error),
}

fn unusable(dir: &Path, reason: impl ToString) -> PersistError {
    PersistError::ReportDir {
        path: dir.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Makes sure `dir` can receive reports, creating it and its parents when absent.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unusable(dir, "a file with that name already exists")),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| unusable(dir, err))
        }
        Err(err) => Err(unusable(dir, err)),
    }
}

/// Saves report bytes under their artifact filename in one directory.
///
/// Readers of the directory see either the previous report or the complete new one.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let report = self.dir.join(filename);
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;

        // Downloading the same artifact again overwrites the earlier copy.
        staged.persist(&report).map_err(|err| PersistError::Io(err.error))?;
        Ok(report)
    }
}
