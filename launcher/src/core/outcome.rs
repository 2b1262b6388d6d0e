//! How a child run ended, and the exit code the launcher reports for it.
//!
//! The mapping follows shell conventions so cron mail and wrapper scripts see
//! the same numbers they would from `sh -c './prog >> log 2>&1'`.

use std::process::ExitStatus;

use crate::exit_codes;

/// Terminal state of a child process that was started successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    /// The child exited on its own with this code.
    Exited(i32),
    /// The child was terminated by this signal number.
    Signaled(i32),
    /// The child outlived the configured timeout and was killed.
    TimedOut,
}

impl ChildOutcome {
    /// Classify an `ExitStatus` returned by `wait`.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }
        // Neither code nor signal: treat like an abnormal termination.
        Self::Exited(exit_codes::SETUP_FAILED)
    }

    /// Exit code the launcher itself should terminate with.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => exit_codes::SIGNAL_BASE + signal,
            Self::TimedOut => exit_codes::TIMED_OUT,
        }
    }

    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }
}
