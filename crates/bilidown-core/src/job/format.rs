//! Stream format tag → file extension.

/// File extension for a stream format tag. Known FLV variants collapse to
/// `flv`; unknown tags pass through; no tag gives `bin`.
pub fn file_extension(format: Option<&str>) -> &str {
    match format {
        Some("hdflv2" | "flv_p60" | "flv" | "flv720" | "flv480") => "flv",
        Some("mp4") => "mp4",
        Some(other) if !other.is_empty() => other,
        _ => "bin",
    }
}

/// Default output file name `<id>.<ext>`, with path separators replaced by spaces.
pub fn default_file_name(video_id: &str, format: Option<&str>) -> String {
    format!("{}.{}", video_id, file_extension(format)).replace(['/', '\\'], " ")
}
