//! RangeFetcher: one authenticated, range-scoped retrieval per fragment.
//!
//! Each fetch first sends a CORS-style OPTIONS probe with browser headers; a
//! non-200 answer fails the fragment with an auth error before any data is
//! requested. The ranged GET that follows must answer 200/206 with a
//! `Content-Length` equal to the fragment length. No retries.
//! Runs in the current thread; call from a worker thread or `spawn_blocking`.

mod headers;
mod parse;
mod pool;
mod preflight;
mod range;

pub use headers::{RequestHeaders, ORIGIN, USER_AGENT};
pub use pool::BufferPool;

use std::time::Duration;

use crate::error::DownloadError;
use crate::job::DownloadJob;
use crate::segmenter::Fragment;

/// Retrieves the bytes of one fragment.
///
/// `buf` is an empty buffer from the job's [`BufferPool`]; implementations fill
/// it and return it on success.
pub trait FragmentFetcher: Send + Sync {
    fn fetch(&self, fragment: &Fragment, buf: Vec<u8>) -> Result<Vec<u8>, DownloadError>;
}

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Whole-request limit (preflight and range GET each).
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl FetchOptions {
    /// libcurl reads a zero timeout as "never", which would leave in-flight
    /// requests unbounded after a job fails.
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(DownloadError::InvalidJob(format!(
                "timeouts must be non-zero (request {:?}, connect {:?})",
                self.request_timeout, self.connect_timeout
            )));
        }
        Ok(())
    }
}

/// Production fetcher over libcurl.
#[derive(Debug, Clone)]
pub struct RangeFetcher {
    url: String,
    video_id: String,
    opts: FetchOptions,
}

impl RangeFetcher {
    pub fn new(job: &DownloadJob, opts: FetchOptions) -> Self {
        Self {
            url: job.url().to_string(),
            video_id: job.video_id().to_string(),
            opts,
        }
    }
}

impl FragmentFetcher for RangeFetcher {
    fn fetch(&self, fragment: &Fragment, buf: Vec<u8>) -> Result<Vec<u8>, DownloadError> {
        preflight::check(&self.url, &self.video_id, fragment.index, &self.opts)?;
        range::fetch_range(&self.url, &self.video_id, fragment, buf, &self.opts)
    }
}

/// Maps a curl failure on `fragment` into a transport error.
fn transport(fragment: usize) -> impl Fn(curl::Error) -> DownloadError {
    move |source| DownloadError::Transport { fragment, source }
}
