use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::app_paths::AppPaths;

/// Initialize tracing into a timestamped log file under the app log dir.
///
/// The terminal belongs to the TUI, so nothing is ever logged to stdout or
/// stderr after startup. Returns the log file path so main can announce it.
pub fn init_tracing() -> Result<PathBuf> {
    let log_dir = AppPaths::log_dir()?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("screener-cli_{}.log", timestamp));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // "latest.log" pointer for easy tailing
    let latest_path = log_dir.join("latest.log");
    #[cfg(unix)]
    {
        let _ = std::fs::remove_file(&latest_path);
        let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
    }
    #[cfg(windows)]
    {
        let _ = std::fs::write(
            &latest_path,
            format!("Current log file: {}\n", log_path.display()),
        );
    }

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!(target: "system", "logging initialized");

    Ok(log_path)
}
