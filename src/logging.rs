use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, Result};

pub const DEFAULT_LEVEL: &str = "info";

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(level: Option<&str>) -> String {
    format!("mdnav={}", level.unwrap_or(DEFAULT_LEVEL))
}

/// Install the global subscriber, appending to `log_file`.
///
/// Without a log file nothing is installed: the terminal belongs to the TUI.
pub fn init(log_file: Option<&Path>, level: Option<&str>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| AppError::Config(format!("failed to install logger: {}", e)))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}
