//! Path-list composition for `PATH`-style variables.

use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Separator between entries of a path-list variable on this platform.
#[cfg(windows)]
pub const SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const SEPARATOR: char = ':';

/// Build `<prefix[0]>:<prefix[1]>:...:<inherited>`.
///
/// The inherited value is appended unchanged. An unset variable is treated as
/// the empty string, so the result always ends with a separator followed by
/// whatever was inherited.
pub fn prepend<P: AsRef<Path>>(prefix: &[P], inherited: Option<&OsStr>) -> OsString {
    let mut out = OsString::new();
    for entry in prefix {
        out.push(entry.as_ref().as_os_str());
        out.push(SEPARATOR.to_string());
    }
    out.push(inherited.unwrap_or_default());
    out
}

/// Check that `entry` can be placed in a path list without changing its meaning.
pub fn check_entry(entry: &Path) -> Result<(), String> {
    let raw = entry.as_os_str();
    if raw.is_empty() {
        return Err("path list entry must not be empty".to_string());
    }
    if raw.to_string_lossy().contains(SEPARATOR) {
        return Err(format!(
            "path list entry {} contains the separator '{}'",
            entry.display(),
            SEPARATOR
        ));
    }
    Ok(())
}
