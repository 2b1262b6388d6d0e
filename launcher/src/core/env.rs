//! The environment handed to the child process.
//!
//! Values are computed once from the inherited environment and passed to the
//! child explicitly. The launcher's own process environment is never touched.

use std::ffi::{OsStr, OsString};

use crate::core::path_list;
use crate::io::config::{LauncherConfig, PathOverride};

/// One composed variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: OsString,
}

impl EnvVar {
    fn compose<F>(paths: &PathOverride, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let inherited = lookup(&paths.var);
        Self {
            name: paths.var.clone(),
            value: path_list::prepend(&paths.prepend, inherited.as_deref()),
        }
    }
}

/// Search path and import path for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEnv {
    pub search_path: EnvVar,
    pub import_path: EnvVar,
}

impl LaunchEnv {
    /// Compose both variables, reading inherited values through `lookup`.
    pub fn compose<F>(cfg: &LauncherConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        Self {
            search_path: EnvVar::compose(&cfg.search_path, &lookup),
            import_path: EnvVar::compose(&cfg.import_path, &lookup),
        }
    }

    /// Compose both variables from the current process environment.
    pub fn from_process(cfg: &LauncherConfig) -> Self {
        Self::compose(cfg, |name| std::env::var_os(name))
    }

    /// Variables in the order they are applied to the child.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        [&self.search_path, &self.import_path]
            .into_iter()
            .map(|var| (var.name.as_str(), var.value.as_os_str()))
    }
}
