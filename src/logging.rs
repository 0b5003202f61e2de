//! Structured logging for ovt using the tracing crate.
//!
//! Writes to daily-rotated files under the XDG state directory and never to
//! the terminal, which belongs to the TUI. Old log files beyond the 7 most
//! recent days are removed at startup.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Keeps the non-blocking appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes file-based logging.
///
/// Log level comes from `RUST_LOG`, defaulting to "info".
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = get_log_dir()?;

    if let Err(e) = cleanup_old_logs(&log_dir) {
        eprintln!("Warning: Failed to cleanup old logs: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "ovt.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log dir: {}", log_dir.display());
    Ok(())
}

/// Log directory per the XDG Base Directory Specification:
/// `$XDG_STATE_HOME/ovt`, falling back to `~/.local/state/ovt`.
pub fn get_log_dir() -> Result<PathBuf, anyhow::Error> {
    let log_dir = if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg_state).join("ovt")
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        home.join(".local/state/ovt")
    };

    fs::create_dir_all(&log_dir)?;

    Ok(log_dir)
}

/// Removes rotated log files beyond the 7 most recent days.
fn cleanup_old_logs(log_dir: &PathBuf) -> Result<(), anyhow::Error> {
    const MAX_LOG_FILES: usize = 7;

    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            let file_name = path.file_name()?.to_string_lossy().to_string();

            // Rotated files look like ovt.log.YYYY-MM-DD
            if file_name.starts_with("ovt.log.") && file_name.matches('-').count() == 2 {
                let modified = fs::metadata(&path).ok()?.modified().ok()?;
                Some((path, modified))
            } else {
                None
            }
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}
