//! Download job description.
//!
//! `DownloadInfo` is what resource discovery hands over (identifier, size, URL,
//! format tag). `DownloadJob` is the immutable, validated form the engine runs.

mod format;

pub use format::{default_file_name, file_extension};

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

use crate::error::DownloadError;
use crate::segmenter::{plan_fragments, Fragment, DEFAULT_FRAGMENT_SIZE};

/// Resource description produced by the discovery step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// Resource identifier (e.g. `BV1xx411c7mD`); used to build auth headers.
    pub video_id: String,
    /// Total size in bytes.
    pub size: u64,
    /// Absolute URL of the stream.
    pub url: String,
    /// Stream format tag; passed through, not used by the engine.
    #[serde(default)]
    pub format: Option<String>,
}

/// A validated download job. Immutable once created.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    info: DownloadInfo,
    fragment_size: NonZeroU64,
    fragments: Vec<Fragment>,
}

impl DownloadJob {
    /// Validates `info` and plans its fragments.
    pub fn new(info: DownloadInfo, fragment_size: NonZeroU64) -> Result<Self, DownloadError> {
        let parsed = url::Url::parse(&info.url)
            .map_err(|e| DownloadError::InvalidJob(format!("bad URL {:?}: {}", info.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(DownloadError::InvalidJob(format!(
                "URL {:?} is not an absolute http(s) URL",
                info.url
            )));
        }
        if info.video_id.trim().is_empty() {
            return Err(DownloadError::InvalidJob("empty resource identifier".into()));
        }
        let fragments = plan_fragments(info.size, fragment_size);
        Ok(Self {
            info,
            fragment_size,
            fragments,
        })
    }

    /// Same as [`DownloadJob::new`] with the default 8 MiB fragment size.
    pub fn with_default_fragment_size(info: DownloadInfo) -> Result<Self, DownloadError> {
        Self::new(info, DEFAULT_FRAGMENT_SIZE)
    }

    pub fn url(&self) -> &str {
        &self.info.url
    }

    pub fn video_id(&self) -> &str {
        &self.info.video_id
    }

    pub fn total_size(&self) -> u64 {
        self.info.size
    }

    pub fn fragment_size(&self) -> NonZeroU64 {
        self.fragment_size
    }

    pub fn format(&self) -> Option<&str> {
        self.info.format.as_deref()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}
