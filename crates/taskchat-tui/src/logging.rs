use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,taskchat_core=debug,taskchat_tui=debug";

/// Default log location: `<data dir>/taskchat/taskchat.log`
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("taskchat")
        .join("taskchat.log")
}

/// Initialize tracing to a log file.
///
/// The terminal belongs to the TUI, so nothing is written to stdout/stderr.
/// Default level comes from `DEFAULT_FILTER`, override via RUST_LOG.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init(path: &Path) -> Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log path has no file name: {}", path.display()))?;

    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(path = %path.display(), "Tracing initialized");
    Ok(guard)
}
