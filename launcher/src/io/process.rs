//! Running the child process with its output attached to the log file.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::env::LaunchEnv;
use crate::core::outcome::ChildOutcome;
use crate::error::LaunchError;
use crate::io::log_file::LogFile;

/// Parameters for one child run.
#[derive(Debug, Clone)]
pub struct ChildRequest {
    /// Directory the child starts in.
    pub workdir: PathBuf,
    /// Program to execute, already resolved against `workdir` when relative.
    pub program: PathBuf,
    /// Composed path variables, layered over the inherited environment.
    pub env: LaunchEnv,
    /// Kill the child after this long. `None` waits until it exits.
    pub timeout: Option<Duration>,
}

/// Abstraction over how the child is started.
///
/// Implementations write everything the child prints to `log` and report how
/// the child ended. A program that cannot be started is reported as
/// [`LaunchError::Spawn`].
pub trait ChildRunner {
    fn run(&self, request: &ChildRequest, log: &LogFile) -> Result<ChildOutcome>;
}

/// Runs the program as a real OS process.
pub struct ProcessRunner;

impl ChildRunner for ProcessRunner {
    #[instrument(skip_all, fields(program = %request.program.display()))]
    fn run(&self, request: &ChildRequest, log: &LogFile) -> Result<ChildOutcome> {
        let (stdout, stderr) = log.child_stdio()?;

        let mut cmd = Command::new(&request.program);
        cmd.current_dir(&request.workdir)
            .envs(request.env.vars())
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr);

        run_command(cmd, &request.program, request.timeout)
    }
}

/// Spawn `cmd` and wait for it, killing it if `timeout` elapses first.
///
/// The command's stdio must already be configured by the caller.
pub fn run_command(
    mut cmd: Command,
    program: &Path,
    timeout: Option<Duration>,
) -> Result<ChildOutcome> {
    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(source) => {
            error!(err = %source, "failed to spawn command");
            return Err(LaunchError::Spawn {
                program: program.to_path_buf(),
                source,
            }
            .into());
        }
    };
    info!(pid = child.id(), "child started");

    let outcome = match timeout {
        None => ChildOutcome::from_status(child.wait().context("wait for command")?),
        Some(limit) => match child.wait_timeout(limit).context("wait for command")? {
            Some(status) => ChildOutcome::from_status(status),
            None => {
                warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
                child.kill().context("kill command")?;
                child.wait().context("wait command after kill")?;
                ChildOutcome::TimedOut
            }
        },
    };

    debug!(?outcome, "command finished");
    Ok(outcome)
}
