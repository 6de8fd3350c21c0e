//! Tracing setup.
//!
//! The TUI owns the terminal, so interactive sessions only log when a file is
//! configured. One-shot runs fall back to stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub const LOG_ENV: &str = "HTTPEEK_LOG";

pub fn init(config: &LogConfig, interactive: bool) -> Result<()> {
    let filter = || EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_timer(ChronoLocal::rfc_3339())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;
        }
        None if !interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_timer(ChronoLocal::rfc_3339())
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;
        }
        None => {}
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
