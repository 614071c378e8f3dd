//! Durable storage for the reward payload.

use std::io;
use std::path::{Path, PathBuf};

use gridsig_utils::{AtomicWriteOptions, PersistMode, atomic_write_with_options};

#[derive(Debug, Clone)]
pub struct FlagStore {
    path: PathBuf,
}

impl FlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `flag` followed by a newline, replacing any previous file.
    pub fn persist(&self, flag: &str) -> io::Result<()> {
        let options = AtomicWriteOptions {
            mode: PersistMode::OwnerOnly,
            ..AtomicWriteOptions::default()
        };
        atomic_write_with_options(&self.path, format!("{flag}\n").as_bytes(), options)?;
        tracing::info!(path = %self.path.display(), "Flag persisted");
        Ok(())
    }
}
