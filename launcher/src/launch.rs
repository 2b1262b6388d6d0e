//! Launch orchestration: resolve the working directory, open the log, run the
//! child, report how it ended.
//!
//! The environment is composed by the caller (see [`LaunchEnv`]) so it can be
//! printed or inspected without starting anything.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::core::env::LaunchEnv;
use crate::core::outcome::ChildOutcome;
use crate::error::LaunchError;
use crate::io::config::LauncherConfig;
use crate::io::log_file::LogFile;
use crate::io::process::{ChildRequest, ChildRunner};
use crate::io::workdir::Workdir;

/// A child run that started and finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub outcome: ChildOutcome,
    pub log_path: PathBuf,
}

impl LaunchReport {
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

/// Run the configured program once.
///
/// Nothing touches the filesystem until the working directory has resolved.
/// If it does not, the log file is neither created nor modified.
#[instrument(skip_all, fields(workdir = %cfg.workdir.display()))]
pub fn launch<R: ChildRunner>(
    cfg: &LauncherConfig,
    env: LaunchEnv,
    runner: &R,
) -> Result<LaunchReport> {
    let workdir = Workdir::enter(&cfg.workdir)?;
    let log = LogFile::open_append(&workdir.join(&cfg.log_file))?;
    if cfg.lock_log {
        log.try_lock()?;
    }

    let request = ChildRequest {
        workdir: workdir.path().to_path_buf(),
        program: workdir.program(&cfg.program),
        env,
        timeout: cfg.timeout(),
    };

    let outcome = match runner.run(&request, &log) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(spawn @ LaunchError::Spawn { .. }) = err.downcast_ref::<LaunchError>() {
                record_spawn_failure(&log, spawn);
            }
            return Err(err);
        }
    };

    if outcome.success() {
        info!(log = %log.path().display(), "child finished");
    } else {
        warn!(?outcome, log = %log.path().display(), "child did not succeed");
    }
    Ok(LaunchReport {
        outcome,
        log_path: log.path().to_path_buf(),
    })
}

// A shell running `prog >> log 2>&1` reports exec failures into the log, since
// redirection is already in place. Keep that behaviour.
fn record_spawn_failure(log: &LogFile, err: &LaunchError) {
    let line = format!("launcher: {err}\n");
    if let Err(write_err) = log.append(line.as_bytes()) {
        warn!(err = %write_err, "failed to record spawn failure in log");
    }
}

/// Human-readable summary of what `launch` would do, one `key=value` per line.
pub fn describe(cfg: &LauncherConfig, env: &LaunchEnv) -> String {
    let vars = env
        .vars()
        .map(|(name, value)| format!("{name}={}\n", value.to_string_lossy()));
    let paths = [
        ("workdir", &cfg.workdir),
        ("program", &cfg.program),
        ("log_file", &cfg.log_file),
    ]
    .into_iter()
    .map(|(key, path)| format!("{key}={}\n", path.display()));
    vars.chain(paths).collect()
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use serial_test::serial;

    use super::*;
    use crate::exit_codes;
    use crate::io::process::ProcessRunner;
    use crate::test_support::{ScriptedRunner, Sandbox};

    #[test]
    fn missing_workdir_aborts_before_log_or_child() {
        let sandbox = Sandbox::new().expect("sandbox");
        let mut cfg = sandbox.config();
        cfg.workdir = sandbox.root().join("does-not-exist");
        let runner = ScriptedRunner::new(vec![(b"never\n".to_vec(), ChildOutcome::Exited(0))]);

        let err = launch(&cfg, sandbox.env(), &runner).expect_err("missing workdir");

        assert_eq!(crate::error::exit_code_for(&err), exit_codes::SETUP_FAILED);
        assert_eq!(runner.calls(), 0);
        assert!(!cfg.workdir.join(&cfg.log_file).exists());
    }

    #[test]
    fn child_exit_code_becomes_launch_exit_code() {
        let sandbox = Sandbox::new().expect("sandbox");
        let runner = ScriptedRunner::new(vec![(b"working\n".to_vec(), ChildOutcome::Exited(3))]);

        let report = launch(&sandbox.config(), sandbox.env(), &runner).expect("launch");

        assert_eq!(report.exit_code(), 3);
        assert_eq!(sandbox.read_log(), "working\n");
    }

    #[test]
    fn runner_receives_resolved_request() {
        let sandbox = Sandbox::new().expect("sandbox");
        let runner = ScriptedRunner::new(vec![(Vec::new(), ChildOutcome::Exited(0))]);
        let cfg = sandbox.config();

        launch(&cfg, sandbox.env(), &runner).expect("launch");

        let request = runner.last_request().expect("request");
        let workdir = fs::canonicalize(&cfg.workdir).expect("canonicalize");
        assert_eq!(request.workdir, workdir);
        assert_eq!(request.program, workdir.join(&cfg.program));
        assert_eq!(request.env, sandbox.env());
        assert_eq!(request.timeout, None);
    }

    #[test]
    fn repeated_launches_append_blocks_in_order() {
        let sandbox = Sandbox::new().expect("sandbox");
        fs::write(sandbox.log_path(), "earlier\n").expect("seed log");
        let runner = ScriptedRunner::new(vec![
            (b"run 1 line a\nrun 1 line b\n".to_vec(), ChildOutcome::Exited(0)),
            (b"run 2 line a\n".to_vec(), ChildOutcome::Exited(1)),
        ]);

        let first = launch(&sandbox.config(), sandbox.env(), &runner).expect("first");
        let second = launch(&sandbox.config(), sandbox.env(), &runner).expect("second");

        assert_eq!(first.exit_code(), 0);
        assert_eq!(second.exit_code(), 1);
        assert_eq!(
            sandbox.read_log(),
            "earlier\nrun 1 line a\nrun 1 line b\nrun 2 line a\n"
        );
    }

    #[test]
    fn held_lock_refuses_to_start_child() {
        let sandbox = Sandbox::new().expect("sandbox");
        let mut cfg = sandbox.config();
        cfg.lock_log = true;
        let holder = LogFile::open_append(&sandbox.log_path()).expect("open");
        holder.try_lock().expect("hold lock");
        let runner = ScriptedRunner::new(vec![(b"never\n".to_vec(), ChildOutcome::Exited(0))]);

        let err = launch(&cfg, sandbox.env(), &runner).expect_err("locked");

        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::LogLocked { .. })
        ));
        assert_eq!(runner.calls(), 0);
        assert_eq!(sandbox.read_log(), "");
    }

    #[test]
    #[serial]
    fn missing_program_leaves_only_error_line_in_log() {
        let sandbox = Sandbox::new().expect("sandbox");

        let err = launch(&sandbox.config(), sandbox.env(), &ProcessRunner).expect_err("spawn");

        assert_eq!(crate::error::exit_code_for(&err), exit_codes::NOT_FOUND);
        let log = sandbox.read_log();
        assert_eq!(log.lines().count(), 1, "log: {log:?}");
        assert!(log.starts_with("launcher: "));
    }

    #[test]
    #[serial]
    fn non_executable_program_maps_to_126() {
        let sandbox = Sandbox::new().expect("sandbox");
        let cfg = sandbox.config();
        fs::write(cfg.workdir.join(&cfg.program), "#!/bin/sh\necho hi\n").expect("write");

        let err = launch(&cfg, sandbox.env(), &ProcessRunner).expect_err("spawn");

        assert_eq!(crate::error::exit_code_for(&err), exit_codes::NOT_EXECUTABLE);
        assert!(!sandbox.read_log().contains("hi"));
    }

    #[test]
    #[serial]
    fn real_process_appends_across_runs() {
        let sandbox = Sandbox::new().expect("sandbox");
        sandbox
            .install_program("echo out\necho err >&2\nexit 4\n")
            .expect("install");

        let first = launch(&sandbox.config(), sandbox.env(), &ProcessRunner).expect("first");
        let second = launch(&sandbox.config(), sandbox.env(), &ProcessRunner).expect("second");

        assert_eq!(first.exit_code(), 4);
        assert_eq!(second.exit_code(), 4);
        assert_eq!(sandbox.read_log(), "out\nerr\nout\nerr\n");
    }

    #[test]
    fn describe_lists_variables_then_paths() {
        let cfg = LauncherConfig::default();
        let env = LaunchEnv::compose(&cfg, |_| None);
        let text = describe(&cfg, &env);
        let keys: Vec<&str> = text
            .lines()
            .filter_map(|line| line.split_once('=').map(|(key, _)| key))
            .collect();
        assert_eq!(
            keys,
            vec!["PATH", "PYTHONPATH", "workdir", "program", "log_file"]
        );
    }

    #[test]
    fn describe_renders_one_terminated_line_per_entry() {
        let cfg = LauncherConfig::default();
        let env = LaunchEnv::compose(&cfg, |_| None);
        let text = describe(&cfg, &env);

        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("\nprogram=./taschenkrebs.py\n"));
        assert!(text.contains("\nlog_file=taschenkrebs.log\n"));
        let import_line = format!(
            "PYTHONPATH={}:\n",
            cfg.import_path.prepend[0].display()
        );
        assert!(text.contains(&import_line), "got {text}");
    }
}
