//! Logging configuration using tracing

use crate::app_dirs::AppDirs;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "KEYRUSH_LOG";

/// Initialize file logging.
///
/// The TUI owns the terminal, so logs only go to a daily rolling file under the
/// state directory. The level is controlled by `KEYRUSH_LOG`:
///
/// ```bash
/// KEYRUSH_LOG=debug keyrush --mode words
/// ```
pub fn init() -> Result<PathBuf> {
    let log_dir = AppDirs::log_dir().unwrap_or_else(|| PathBuf::from("logs"));
    init_in(&log_dir)?;
    Ok(log_dir)
}

/// Installs the global subscriber writing under `log_dir`. Fails if one is already set.
pub fn init_in(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "keyrush.log");

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("keyrush=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    tracing::info!("keyrush starting, logging to {}", log_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn second_init_reports_an_io_error() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        init_in(&log_dir).unwrap();
        assert!(log_dir.is_dir());

        let err = init_in(&log_dir).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::Other));
    }
}
