//! `bilidown fetch` – download one stream to a file or stdout.

use anyhow::{Context, Result};
use bilidown_core::config::{BilidownConfig, SinkMode};
use bilidown_core::job::default_file_name;
use bilidown_core::progress::ProgressStats;
use bilidown_core::storage;
use bilidown_core::{download, DownloadInfo, DownloadJob, EngineOptions, OutputSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::EngineArgs;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Where the bytes go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Stdout,
    File(PathBuf),
}

impl Target {
    /// `-` is stdout; no path means `<id>.<ext>` in the current directory.
    pub(crate) fn resolve(output: Option<PathBuf>, info: &DownloadInfo) -> Self {
        match output {
            Some(p) if p.as_os_str() == "-" => Target::Stdout,
            Some(p) => Target::File(p),
            None => Target::File(PathBuf::from(default_file_name(
                &info.video_id,
                info.format.as_deref(),
            ))),
        }
    }
}

/// Engine options from config overridden by flags.
pub(crate) fn engine_options(engine: &EngineArgs, cfg: &BilidownConfig) -> EngineOptions {
    let mut opts = cfg.engine_options();
    if let Some(workers) = engine.workers {
        opts.workers = Some(workers);
    }
    if let Some(secs) = engine.timeout {
        opts.fetch.request_timeout = Duration::from_secs(secs);
    }
    opts
}

pub(crate) fn fragment_size(engine: &EngineArgs, cfg: &BilidownConfig) -> Result<NonZeroU64> {
    match engine.fragment_size {
        Some(n) => NonZeroU64::new(n).context("--fragment-size must be greater than 0"),
        None => cfg.fragment_size(),
    }
}

pub async fn run_fetch(
    info: DownloadInfo,
    output: Option<PathBuf>,
    engine: &EngineArgs,
    cfg: &BilidownConfig,
) -> Result<()> {
    let target = Target::resolve(output, &info);
    let job = DownloadJob::new(info, fragment_size(engine, cfg)?)?;
    let sequential =
        engine.sequential || cfg.sink == SinkMode::Sequential || target == Target::Stdout;

    let mut opts = engine_options(engine, cfg);
    let (progress_tx, progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    opts.progress = Some(progress_tx);
    let progress_handle = tokio::spawn(print_progress(progress_rx));

    tracing::info!(
        id = job.video_id(),
        size = job.total_size(),
        fragments = job.fragments().len(),
        ?target,
        sequential,
        "starting fetch"
    );

    let result = {
        let target = target.clone();
        tokio::task::spawn_blocking(move || fetch_blocking(&job, &target, sequential, &opts))
            .await
            .context("download task failed")?
    };
    let _ = progress_handle.await;
    result?;

    if let Target::File(path) = &target {
        eprintln!("saved {}", path.display());
    }
    Ok(())
}

fn fetch_blocking(
    job: &DownloadJob,
    target: &Target,
    sequential: bool,
    opts: &EngineOptions,
) -> Result<()> {
    match target {
        Target::Stdout => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            download(job, OutputSink::Sequential(&mut lock), opts)?;
            Ok(())
        }
        Target::File(path) if sequential => fetch_sequential(job, path, opts),
        Target::File(path) => fetch_positional(job, path, opts),
    }
}

fn fetch_positional(job: &DownloadJob, path: &Path, opts: &EngineOptions) -> Result<()> {
    let writer = storage::create_for(path, job)?;
    if let Err(e) = download(job, OutputSink::Positional(&writer), opts) {
        discard(writer.temp_path());
        return Err(e.into());
    }
    writer.sync()?;
    writer.finalize(path)
}

fn fetch_sequential(job: &DownloadJob, path: &Path, opts: &EngineOptions) -> Result<()> {
    let temp = storage::temp_path(path);
    let file = File::create(&temp).with_context(|| format!("create {}", temp.display()))?;
    let mut out = BufWriter::new(file);
    if let Err(e) = download(job, OutputSink::Sequential(&mut out), opts) {
        drop(out);
        discard(&temp);
        return Err(e.into());
    }
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(&temp, path)
        .with_context(|| format!("failed to rename {} to {}", temp.display(), path.display()))?;
    Ok(())
}

/// Remove a partial output file after a failed job.
fn discard(temp: &Path) {
    match std::fs::remove_file(temp) {
        Ok(()) => tracing::debug!(path = %temp.display(), "removed partial file"),
        Err(e) => tracing::warn!(path = %temp.display(), error = %e, "could not remove partial file"),
    }
}

async fn print_progress(mut rx: tokio::sync::mpsc::Receiver<ProgressStats>) {
    let mut last_print: Option<Instant> = None;
    let mut printed = false;
    while let Some(stats) = rx.recv().await {
        let now = Instant::now();
        let due = last_print
            .map(|t| now.duration_since(t).as_millis() as u64 >= PROGRESS_INTERVAL_MS)
            .unwrap_or(true);
        if due || stats.is_complete() {
            eprint!("\r{}", format_progress(&stats));
            let _ = io::stderr().flush();
            last_print = Some(now);
            printed = true;
        }
    }
    if printed {
        eprintln!();
    }
}

pub(crate) fn format_progress(stats: &ProgressStats) -> String {
    let done_mib = stats.bytes_done as f64 / 1_048_576.0;
    let total_mib = stats.total_bytes as f64 / 1_048_576.0;
    let rate_mib = stats.bytes_per_sec() / 1_048_576.0;
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "  {:.1} / {:.1} MiB ({:.1}%)  {}/{} fragments  {:.2} MiB/s  ETA {}  ",
        done_mib,
        total_mib,
        stats.fraction() * 100.0,
        stats.fragments_done,
        stats.fragment_count,
        rate_mib,
        eta
    )
}
