//! Test-only helpers: scratch deployments, scripted child runners, scripts.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::env::LaunchEnv;
use crate::core::outcome::ChildOutcome;
use crate::io::config::LauncherConfig;
use crate::io::log_file::LogFile;
use crate::io::process::{ChildRequest, ChildRunner};

/// A throwaway deployment: a temp root with a `data/` working directory.
pub struct Sandbox {
    temp: TempDir,
    workdir: PathBuf,
}

impl Sandbox {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let workdir = temp.path().join("data");
        fs::create_dir_all(&workdir)
            .with_context(|| format!("create {}", workdir.display()))?;
        Ok(Self { temp, workdir })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Default config with the working directory pointed into the sandbox.
    pub fn config(&self) -> LauncherConfig {
        LauncherConfig {
            workdir: self.workdir.clone(),
            ..LauncherConfig::default()
        }
    }

    /// Environment composed from this process, so scripts still find `sleep` etc.
    pub fn env(&self) -> LaunchEnv {
        LaunchEnv::from_process(&self.config())
    }

    pub fn log_path(&self) -> PathBuf {
        self.workdir.join(self.config().log_file)
    }

    /// Log contents, or the empty string if the log was never created.
    pub fn read_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// Write the configured program as an executable shell script.
    pub fn install_program(&self, body: &str) -> Result<PathBuf> {
        let cfg = self.config();
        let name = cfg
            .program
            .file_name()
            .ok_or_else(|| anyhow!("program has no file name"))?;
        write_script(&self.workdir, Path::new(name), body)
    }

    /// Write a TOML config pointing at this sandbox and return its path.
    pub fn write_config(&self, extra: &str) -> Result<PathBuf> {
        let path = self.root().join("launcher.toml");
        let contents = format!("workdir = {:?}\n{extra}", self.workdir.display().to_string());
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Write `#!/bin/sh` + `body` to `dir/name` and mark it executable.
pub fn write_script(dir: &Path, name: impl AsRef<Path>, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}"))
        .with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", path.display()))?;
    }
    Ok(path)
}

/// Child runner that replays canned output instead of spawning processes.
pub struct ScriptedRunner {
    queue: RefCell<VecDeque<(Vec<u8>, ChildOutcome)>>,
    calls: Cell<usize>,
    last_request: RefCell<Option<ChildRequest>>,
}

impl ScriptedRunner {
    pub fn new(runs: Vec<(Vec<u8>, ChildOutcome)>) -> Self {
        Self {
            queue: RefCell::new(runs.into()),
            calls: Cell::new(0),
            last_request: RefCell::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_request(&self) -> Option<ChildRequest> {
        self.last_request.borrow().clone()
    }
}

impl ChildRunner for ScriptedRunner {
    fn run(&self, request: &ChildRequest, log: &LogFile) -> Result<ChildOutcome> {
        self.calls.set(self.calls.get() + 1);
        *self.last_request.borrow_mut() = Some(request.clone());
        let (output, outcome) = self
            .queue
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted runner has no more runs"))?;
        log.append(&output)?;
        Ok(outcome)
    }
}
