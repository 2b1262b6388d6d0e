//! Taschenkrebs launcher.
//!
//! With no arguments, runs `./taschenkrebs.py` inside the fixed data directory
//! with the local install's `PATH`/`PYTHONPATH` prepended, appending its output
//! to `taschenkrebs.log`, and exits with the program's status.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use launcher::core::env::LaunchEnv;
use launcher::error::exit_code_for;
use launcher::exit_codes;
use launcher::io::config::load_config;
use launcher::io::process::ProcessRunner;
use launcher::launch::{describe, launch};
use launcher::logging;

#[derive(Parser)]
#[command(
    name = "launcher",
    version,
    about = "Run taschenkrebs.py with a pinned environment, logging to an append-only file"
)]
struct Cli {
    /// TOML file overriding the built-in paths.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the composed environment and paths, then exit without running anything.
    #[arg(long)]
    print_env: bool,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("launcher: {:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    let env = LaunchEnv::from_process(&cfg);
    debug!(?env, "environment composed");

    if cli.print_env {
        print!("{}", describe(&cfg, &env));
        return Ok(exit_codes::OK);
    }

    let report = launch(&cfg, env, &ProcessRunner)?;
    Ok(report.exit_code())
}
