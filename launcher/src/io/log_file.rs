//! Append-only log file shared by the child's stdout and stderr.

use std::fs::{File, OpenOptions, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::LaunchError;

/// An open, append-mode handle on the log file.
///
/// Both child streams get a clone of the same handle, so writes from stdout and
/// stderr land in the file in the order the child issues them.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: File,
}

impl LogFile {
    /// Open `path` for appending, creating it if absent. Never truncates.
    pub fn open_append(path: &Path) -> Result<Self, LaunchError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| LaunchError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "log file opened for append");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take an exclusive advisory lock, failing at once if another run holds it.
    ///
    /// The lock is released when this handle and every clone handed to the
    /// child are closed.
    pub fn try_lock(&self) -> Result<(), LaunchError> {
        match self.file.try_lock() {
            Ok(()) => {
                debug!(path = %self.path.display(), "log lock acquired");
                Ok(())
            }
            Err(TryLockError::WouldBlock) => {
                warn!(path = %self.path.display(), "log lock held by another run");
                Err(LaunchError::LogLocked {
                    path: self.path.clone(),
                })
            }
            Err(TryLockError::Error(source)) => Err(LaunchError::LogFile {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Stdio handles for the child's stdout and stderr.
    pub fn child_stdio(&self) -> Result<(Stdio, Stdio)> {
        let stdout = self
            .file
            .try_clone()
            .with_context(|| format!("clone log handle {}", self.path.display()))?;
        let stderr = self
            .file
            .try_clone()
            .with_context(|| format!("clone log handle {}", self.path.display()))?;
        Ok((Stdio::from(stdout), Stdio::from(stderr)))
    }

    /// Append raw bytes.
    pub fn append(&self, bytes: &[u8]) -> Result<()> {
        let mut file = &self.file;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .with_context(|| format!("append to {}", self.path.display()))
    }
}
