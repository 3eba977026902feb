//! File-based logging.
//!
//! The interactive player takes over the terminal, so logs go to a daily
//! rolling file under the data directory instead of stderr.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "moodboard";

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
///
/// `RUST_LOG` wins; otherwise `moodboard=info,warn`, or debug when verbose.
pub fn init_logging(log_dir: &Path, verbose: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("moodboard=debug,info")
        } else {
            EnvFilter::new("moodboard=info,warn")
        }
    });

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = ?log_dir, "Logging initialized");
    Ok(guard)
}
