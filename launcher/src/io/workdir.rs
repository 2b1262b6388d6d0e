//! Working-directory resolution.
//!
//! The launcher does not `chdir` itself. It resolves the directory up front,
//! failing fast when it is unusable, and hands the resolved path to the child
//! via `Command::current_dir`. Relative names (program, log file) are joined
//! onto the same path so they resolve exactly as they would after a `cd`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::LaunchError;

/// A working directory that existed and was a directory when resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    path: PathBuf,
}

impl Workdir {
    /// Resolve `path`, following symlinks.
    pub fn enter(path: &Path) -> Result<Self, LaunchError> {
        let resolved = fs::canonicalize(path).map_err(|source| {
            warn!(path = %path.display(), err = %source, "working directory unavailable");
            LaunchError::Workdir {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let meta = fs::metadata(&resolved).map_err(|source| LaunchError::Workdir {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            warn!(path = %path.display(), "working directory is not a directory");
            return Err(LaunchError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        debug!(workdir = %resolved.display(), "working directory resolved");
        Ok(Self { path: resolved })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a file name as if the current directory were this one.
    pub fn join(&self, relative: &Path) -> PathBuf {
        self.path.join(relative)
    }

    /// Resolve a program name as a shell would after `cd`.
    ///
    /// Names containing a path separator are joined onto the directory. Bare
    /// names are returned unchanged so the child's search path applies.
    pub fn program(&self, program: &Path) -> PathBuf {
        if is_bare_name(program) {
            program.to_path_buf()
        } else {
            self.join(program)
        }
    }
}

fn is_bare_name(program: &Path) -> bool {
    let mut components = program.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
