#![allow(dead_code)]

pub mod range_server;

use bilidown_core::DownloadInfo;

/// Deterministic test body of `len` bytes.
pub fn body(len: usize) -> Vec<u8> {
    (0u8..=250).cycle().take(len).collect()
}

pub fn info(url: &str, size: u64) -> DownloadInfo {
    DownloadInfo {
        video_id: "BV1xx411c7mD".to_string(),
        size,
        url: url.to_string(),
        format: Some("flv".to_string()),
    }
}
