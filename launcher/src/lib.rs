//! Launcher for the Taschenkrebs drifter-tracking job.
//!
//! Prepares a fixed execution context for an external program and captures
//! its output:
//!
//! 1. compose `PATH` and `PYTHONPATH` by prepending fixed directories to the
//!    inherited values,
//! 2. resolve the fixed working directory, aborting if it is unusable,
//! 3. run the program with no arguments, stdout and stderr appended to one log
//!    file inside that directory,
//! 4. exit with the program's own status.
//!
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (path composition, exit mapping).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, filesystem, process execution).
//!
//! [`launch`] coordinates the two.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod launch;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
