//! File-backed tracing setup.
//!
//! The terminal belongs to the UI, so log output goes to a rolling file
//! under the XDG state directory. `RUST_LOG` overrides the configured
//! filter.

use std::{env, error::Error, path::PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;

const DAYS_TO_KEEP: usize = 7;

/// Initialize tracing with file output. The returned guard flushes the
/// writer on drop and must outlive the application.
pub fn init(settings: &LoggingSettings) -> Result<WorkerGuard, Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.clone()));

    let log_dir = state_dir().ok_or("cannot determine a log directory")?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("vivace")
        .filename_suffix("log")
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_level(true)
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(guard)
}

/// `$XDG_STATE_HOME/vivace` or `~/.local/state/vivace`.
fn state_dir() -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("vivace"));
    }
    env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("state").join("vivace"))
}
