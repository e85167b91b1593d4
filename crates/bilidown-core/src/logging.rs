//! Logging init: `tracing` to a log file under the XDG state dir, or stderr.
//!
//! `RUST_LOG` wins over the verbosity-derived default filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count: 0 = engine debug, 1 = everything debug
/// plus engine trace, 2+ = trace.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info,bilidown=debug,bilidown_core=debug",
        1 => "debug,bilidown=trace,bilidown_core=trace",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)))
}

/// `~/.local/state/bilidown/bilidown.log`, creating the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bilidown")?;
    xdg_dirs
        .place_state_file("bilidown.log")
        .context("cannot create log directory")
}

/// Log to the XDG state file. Errors if the file cannot be opened or a
/// subscriber is already installed; callers fall back to [`init_logging_stderr`].
pub fn init_logging(verbosity: u8) -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))?;

    tracing::info!(path = %path.display(), verbosity, "logging initialized");
    Ok(path)
}

/// Log to stderr only. Never fails; a second call is a no-op.
pub fn init_logging_stderr(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}
