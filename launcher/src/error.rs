//! Launcher-owned failures that map to specific exit codes.
//!
//! Everything else travels as a plain `anyhow::Error` and is reported as
//! [`exit_codes::SETUP_FAILED`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("working directory {}: {source}", path.display())]
    Workdir { path: PathBuf, source: io::Error },

    #[error("working directory {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("log file {} is locked by another run", path.display())]
    LogLocked { path: PathBuf },

    #[error("{}: {source}", program.display())]
    Spawn { program: PathBuf, source: io::Error },
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { source, .. } => spawn_exit_code(source),
            _ => exit_codes::SETUP_FAILED,
        }
    }
}

/// `ENOEXEC`: the file exists but the kernel cannot execute its format.
#[cfg(unix)]
const ENOEXEC: i32 = 8;

// Only "missing" and "not runnable" get the shell's 127/126. Fork and resource
// failures (EAGAIN, ENOMEM, ...) say nothing about the program itself.
fn spawn_exit_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::NotFound => exit_codes::NOT_FOUND,
        io::ErrorKind::PermissionDenied => exit_codes::NOT_EXECUTABLE,
        #[cfg(unix)]
        _ if err.raw_os_error() == Some(ENOEXEC) => exit_codes::NOT_EXECUTABLE,
        _ => exit_codes::SETUP_FAILED,
    }
}

/// Exit code for any error returned by the launcher.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<LaunchError>())
        .map_or(exit_codes::SETUP_FAILED, LaunchError::exit_code)
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    fn spawn_error(kind: io::ErrorKind) -> LaunchError {
        LaunchError::Spawn {
            program: PathBuf::from("./prog"),
            source: io::Error::from(kind),
        }
    }

    #[test]
    fn spawn_errors_follow_shell_codes() {
        assert_eq!(
            spawn_error(io::ErrorKind::NotFound).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            spawn_error(io::ErrorKind::PermissionDenied).exit_code(),
            exit_codes::NOT_EXECUTABLE
        );
    }

    #[cfg(unix)]
    #[test]
    fn exec_format_error_is_not_executable() {
        let err = LaunchError::Spawn {
            program: PathBuf::from("./prog"),
            source: io::Error::from_raw_os_error(ENOEXEC),
        };
        assert_eq!(err.exit_code(), exit_codes::NOT_EXECUTABLE);
    }

    #[test]
    fn resource_errors_are_setup_failures() {
        assert_eq!(
            spawn_error(io::ErrorKind::OutOfMemory).exit_code(),
            exit_codes::SETUP_FAILED
        );
        assert_eq!(
            spawn_error(io::ErrorKind::WouldBlock).exit_code(),
            exit_codes::SETUP_FAILED
        );
    }

    #[test]
    fn workdir_errors_are_setup_failures() {
        let err = LaunchError::Workdir {
            path: PathBuf::from("/missing"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), exit_codes::SETUP_FAILED);
    }

    #[test]
    fn exit_code_found_through_context() {
        let err = Err::<(), _>(spawn_error(io::ErrorKind::NotFound))
            .context("run child")
            .expect_err("error");
        assert_eq!(exit_code_for(&err), exit_codes::NOT_FOUND);
    }

    #[test]
    fn unclassified_errors_are_setup_failures() {
        let err = anyhow::anyhow!("parse config");
        assert_eq!(exit_code_for(&err), exit_codes::SETUP_FAILED);
    }
}
