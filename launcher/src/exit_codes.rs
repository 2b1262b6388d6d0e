//! Stable exit codes for the launcher.
//!
//! When the child starts, the launcher exits with the child's own code (see
//! [`crate::core::outcome::ChildOutcome::exit_code`]). The codes below are only
//! produced by the launcher itself and mirror the values a POSIX shell uses.

/// Child ran and exited 0.
pub const OK: i32 = 0;
/// Child was killed after exceeding `timeout_secs`.
pub const TIMED_OUT: i32 = 124;
/// Launcher could not start the child: invalid config, unusable working
/// directory, log file not openable, or log lock held by another run.
pub const SETUP_FAILED: i32 = 125;
/// Program exists but could not be executed (permission denied, bad format).
pub const NOT_EXECUTABLE: i32 = 126;
/// Program does not exist.
pub const NOT_FOUND: i32 = 127;
/// Added to the signal number when the child is killed by a signal.
pub const SIGNAL_BASE: i32 = 128;
