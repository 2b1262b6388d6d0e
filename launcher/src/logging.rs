//! Launcher diagnostics on the launcher's own stderr.
//!
//! Two output channels never mix:
//!
//! - **Tracing (this module)**: what the launcher did, filtered by `RUST_LOG`.
//!   Under a cron job stderr usually becomes mail, so the default `warn` level
//!   stays silent for a run whose child exits 0. It speaks up only when the
//!   working directory is unusable, the log is locked, the program cannot be
//!   spawned, the child times out, or the child exits non-zero.
//!
//! - **Child log (`io/log_file`)**: the append-only file holding the child's
//!   stdout and stderr. Always written, unaffected by `RUST_LOG`; launcher
//!   tracing is never written there.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber. Call once, before loading config.
///
/// `RUST_LOG=launcher=debug` additionally shows the composed environment, the
/// resolved working directory, and the child's pid.
pub fn init() {
    tracing_subscriber::registry()
        .with(filter_from_env())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn default_filter_caps_at_warn() {
        assert_eq!(
            EnvFilter::new(DEFAULT_FILTER).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
