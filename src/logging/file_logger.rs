//! File-based diagnostics with automatic rotation
//!
//! The recorder reports its own activity through `tracing`. Hosts that do
//! not install a subscriber of their own can initialize this file-backed
//! one; it rotates daily and keeps a week of history. This rotation
//! applies to the diagnostics channel only, never to the recorded logs.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_DIRECTORY: OnceLock<PathBuf> = OnceLock::new();

/// Get the diagnostics log directory path, once initialized
pub fn get_log_directory() -> Option<PathBuf> {
    LOG_DIRECTORY.get().cloned()
}

/// Initialize file-based diagnostics for `app_name`.
///
/// Creates log files under the app's local data directory with daily
/// rotation, keeping 7 days of history, and mirrors output to the console.
/// Returns the directory the log files live in.
pub fn init_file_logging(app_name: &str) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?
        .join(app_name)
        .join("logs");

    std::fs::create_dir_all(&log_dir)?;
    let _ = LOG_DIRECTORY.set(log_dir.clone());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(7)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; logging lasts the whole app lifetime, so
    // leak it.
    std::mem::forget(guard);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("File logging initialized at: {:?}", log_dir);

    Ok(log_dir)
}
