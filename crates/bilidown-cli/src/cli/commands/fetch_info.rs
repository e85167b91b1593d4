//! `bilidown fetch-info` – download from a serialized DownloadInfo.

use anyhow::{Context, Result};
use bilidown_core::config::BilidownConfig;
use bilidown_core::DownloadInfo;
use std::path::{Path, PathBuf};

use super::fetch::run_fetch;
use crate::cli::EngineArgs;

pub async fn run_fetch_info(
    path: &Path,
    output: Option<PathBuf>,
    engine: &EngineArgs,
    cfg: &BilidownConfig,
) -> Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let info = parse_info(&data).with_context(|| format!("invalid info file {}", path.display()))?;
    run_fetch(info, output, engine, cfg).await
}

pub(crate) fn parse_info(data: &str) -> Result<DownloadInfo> {
    Ok(serde_json::from_str(data)?)
}
