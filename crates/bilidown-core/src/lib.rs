pub mod config;
pub mod logging;

pub mod barrier;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod job;
pub mod progress;
pub mod segmenter;
pub mod sequencer;
pub mod storage;

pub use downloader::{download, download_with, EngineOptions};
pub use error::{DownloadError, ProtocolError};
pub use job::{DownloadInfo, DownloadJob};
pub use sequencer::{OutputSink, PositionalSink};
