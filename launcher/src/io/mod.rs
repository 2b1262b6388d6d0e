//! I/O helpers for the launcher.

pub mod config;
pub mod log_file;
pub mod process;
pub mod workdir;
