//! CLI for the bilidown segmented stream downloader.

mod commands;

use anyhow::Result;
use bilidown_core::config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_fetch, run_fetch_info, run_plan};

/// Top-level CLI for bilidown.
#[derive(Debug, Parser)]
#[command(name = "bilidown")]
#[command(about = "bilidown: concurrent segmented video stream downloader", long_about = None)]
pub struct Cli {
    /// More log detail (-v, -vv). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags that tune the download engine. Unset flags fall back to the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct EngineArgs {
    /// Parallel workers (default: config, else number of CPUs).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Bytes per fragment (default: config, else 8 MiB).
    #[arg(long, value_name = "BYTES")]
    pub fragment_size: Option<u64>,

    /// Per-request timeout in seconds (at least 1).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Write fragments strictly in order instead of at their offsets.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a stream described on the command line.
    Fetch {
        /// Absolute stream URL.
        #[arg(long)]
        url: String,

        /// Total size in bytes.
        #[arg(long)]
        size: u64,

        /// Resource identifier (e.g. BV1xx411c7mD), used for request headers.
        #[arg(long)]
        id: String,

        /// Stream format tag (e.g. flv720, mp4); picks the file extension.
        #[arg(long)]
        format: Option<String>,

        /// Output path; `-` writes to stdout. Default: `<id>.<ext>` in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Download a stream described by a JSON DownloadInfo file.
    FetchInfo {
        /// Path to the JSON file (`video_id`, `size`, `url`, optional `format`).
        path: PathBuf,

        /// Output path; `-` writes to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Print the fragment plan for a resource size.
    Plan {
        /// Total size in bytes.
        #[arg(long)]
        size: u64,

        /// Bytes per fragment.
        #[arg(long)]
        fragment_size: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Fetch {
                url,
                size,
                id,
                format,
                output,
                engine,
            } => {
                let info = bilidown_core::DownloadInfo {
                    video_id: id,
                    size,
                    url,
                    format,
                };
                run_fetch(info, output, &engine, &cfg).await?;
            }
            CliCommand::FetchInfo {
                path,
                output,
                engine,
            } => run_fetch_info(&path, output, &engine, &cfg).await?,
            CliCommand::Plan {
                size,
                fragment_size,
            } => run_plan(size, fragment_size, &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
