use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::EngineOptions;
use crate::fetch::FetchOptions;
use crate::segmenter::DEFAULT_FRAGMENT_SIZE;

/// How output is written: positional writes into a pre-sized file, or strictly
/// ordered appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkMode {
    #[default]
    Positional,
    Sequential,
}

/// Global configuration loaded from `~/.config/bilidown/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BilidownConfig {
    /// Bytes per fragment (must be > 0).
    pub fragment_size: u64,
    /// Worker threads per job; if missing, the number of logical CPUs.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Per-request timeout in seconds (preflight and range GET each).
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Idle payload buffers kept for reuse; if missing, twice the worker count.
    #[serde(default)]
    pub buffer_pool_capacity: Option<usize>,
    /// Output mode: "positional" (default) or "sequential".
    #[serde(default)]
    pub sink: SinkMode,
}

impl Default for BilidownConfig {
    fn default() -> Self {
        Self {
            fragment_size: DEFAULT_FRAGMENT_SIZE.get(),
            workers: None,
            request_timeout_secs: 10,
            connect_timeout_secs: 10,
            buffer_pool_capacity: None,
            sink: SinkMode::Positional,
        }
    }
}

impl BilidownConfig {
    /// Fragment size as a non-zero value; errors on `fragment_size = 0`.
    pub fn fragment_size(&self) -> Result<NonZeroU64> {
        NonZeroU64::new(self.fragment_size).context("fragment_size must be greater than 0")
    }

    /// Rejects values the engine cannot run with. A zero timeout would mean
    /// "no timeout" to libcurl.
    pub fn validate(&self) -> Result<()> {
        self.fragment_size()?;
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if self.connect_timeout_secs == 0 {
            bail!("connect_timeout_secs must be greater than 0");
        }
        Ok(())
    }

    /// Engine options derived from this config (no progress channel).
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            workers: self.workers,
            fetch: FetchOptions {
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            },
            buffer_pool_capacity: self.buffer_pool_capacity,
            progress: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bilidown")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BilidownConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BilidownConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: BilidownConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
