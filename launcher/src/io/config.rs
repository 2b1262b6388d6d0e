//! Launcher configuration.
//!
//! The defaults are the fixed paths of the Taschenkrebs deployment. A TOML
//! file given with `--config` may override any of them; missing fields keep
//! their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};

use crate::core::path_list;

/// Launcher configuration (TOML).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Absolute directory the child runs in.
    pub workdir: PathBuf,

    /// Program to execute, resolved against `workdir` when it contains a path
    /// separator. Started with no arguments.
    pub program: PathBuf,

    /// Append-mode log receiving the child's stdout and stderr, relative to
    /// `workdir`.
    pub log_file: PathBuf,

    /// Executable search path override.
    #[serde(deserialize_with = "search_path_section")]
    pub search_path: PathOverride,

    /// Module import path override.
    #[serde(deserialize_with = "import_path_section")]
    pub import_path: PathOverride,

    /// Kill the child after this many seconds. Unset waits forever.
    pub timeout_secs: Option<u64>,

    /// Hold an exclusive advisory lock on the log file while the child runs.
    pub lock_log: bool,
}

/// Entries prepended to one inherited path-list variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOverride {
    pub var: String,
    pub prepend: Vec<PathBuf>,
}

/// A `[search_path]` / `[import_path]` table as written. Keys left out fall
/// back to that section's own defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PathOverrideSection {
    var: Option<String>,
    prepend: Option<Vec<PathBuf>>,
}

impl PathOverrideSection {
    fn or(self, defaults: PathOverride) -> PathOverride {
        PathOverride {
            var: self.var.unwrap_or(defaults.var),
            prepend: self.prepend.unwrap_or(defaults.prepend),
        }
    }
}

fn search_path_section<'de, D: Deserializer<'de>>(de: D) -> Result<PathOverride, D::Error> {
    PathOverrideSection::deserialize(de).map(|section| section.or(default_search_path()))
}

fn import_path_section<'de, D: Deserializer<'de>>(de: D) -> Result<PathOverride, D::Error> {
    PathOverrideSection::deserialize(de).map(|section| section.or(default_import_path()))
}

const HOME: &str = "/home/taschenkrebs";

fn default_search_path() -> PathOverride {
    let home = Path::new(HOME);
    PathOverride {
        var: "PATH".to_string(),
        prepend: vec![home.join("bin"), home.join(".local/bin")],
    }
}

fn default_import_path() -> PathOverride {
    PathOverride {
        var: "PYTHONPATH".to_string(),
        prepend: vec![Path::new(HOME).join(".local/lib/python3/site-packages")],
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let home = Path::new(HOME);
        Self {
            workdir: home.join("taschenkrebs"),
            program: PathBuf::from("./taschenkrebs.py"),
            log_file: PathBuf::from("taschenkrebs.log"),
            search_path: default_search_path(),
            import_path: default_import_path(),
            timeout_secs: None,
            lock_log: false,
        }
    }
}

impl LauncherConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.workdir.is_absolute() {
            return Err(anyhow!(
                "workdir must be an absolute path, got {}",
                self.workdir.display()
            ));
        }
        if self.program.as_os_str().is_empty() {
            return Err(anyhow!("program must not be empty"));
        }
        if self.log_file.as_os_str().is_empty() || self.log_file.is_absolute() {
            return Err(anyhow!(
                "log_file must be a non-empty path relative to workdir, got {:?}",
                self.log_file
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0 when set"));
        }
        self.search_path.validate("search_path")?;
        self.import_path.validate("import_path")?;
        if self.search_path.var == self.import_path.var {
            return Err(anyhow!(
                "search_path.var and import_path.var must differ, both are {}",
                self.search_path.var
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl PathOverride {
    fn validate(&self, section: &str) -> Result<()> {
        let var = self.var.as_str();
        if var.is_empty() || var.contains('=') || var.contains('\0') {
            return Err(anyhow!("{section}.var is not a valid variable name: {var:?}"));
        }
        for entry in &self.prepend {
            path_list::check_entry(entry).map_err(|msg| anyhow!("{section}.prepend: {msg}"))?;
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// With no path, returns `LauncherConfig::default()`.
pub fn load_config(path: Option<&Path>) -> Result<LauncherConfig> {
    let Some(path) = path else {
        let cfg = LauncherConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    };
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parse {}", path.display()))
}

fn parse_config(contents: &str) -> Result<LauncherConfig> {
    let cfg: LauncherConfig = toml::from_str(contents)?;
    cfg.validate()?;
    Ok(cfg)
}
