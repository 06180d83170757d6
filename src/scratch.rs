//! Scoped scratch files.
//!
//! Every stage that writes an intermediate artifact (narration MP3, encoded
//! video, proposal PDF) acquires a [`ScratchFile`]. The file is removed when
//! the handle drops, on success and failure paths alike, unless ownership is
//! handed to the caller with [`ScratchFile::persist`] or [`ScratchFile::keep`].

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use crate::error::Result;

/// A uniquely named file that lives until dropped or handed off.
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    /// Create an empty scratch file in `dir` ending with `suffix` (e.g. `".mp3"`).
    pub fn create(dir: &Path, suffix: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let file = tempfile::Builder::new()
            .prefix("pitchreel-")
            .suffix(suffix)
            .tempfile_in(dir)?;

        let path = file.into_temp_path();
        debug!("Acquired scratch file {}", path.display());
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file on disk in bytes.
    pub fn len(&self) -> Result<u64> {
        Ok(std::fs::metadata(&*self.path)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Replace the file contents.
    pub async fn write_all(&self, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(&*self.path, bytes).await?;
        Ok(())
    }

    /// Read the whole file.
    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&*self.path).await?)
    }

    /// Move the file to `dest`, handing ownership to the caller.
    ///
    /// Falls back to copy when `dest` is on another filesystem; the scratch
    /// copy is still removed in that case.
    pub fn persist(self, dest: &Path) -> Result<PathBuf> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match self.path.persist(dest) {
            Ok(()) => {}
            Err(err) => {
                debug!(
                    "Rename to {} failed ({}), copying instead",
                    dest.display(),
                    err.error
                );
                let scratch = err.path;
                std::fs::copy(&*scratch, dest)?;
                drop(scratch);
            }
        }

        Ok(dest.to_path_buf())
    }

    /// Keep the file where it is and return its path. The caller owns cleanup.
    pub fn keep(self) -> Result<PathBuf> {
        self.path.keep().map_err(|e| e.error.into())
    }
}
