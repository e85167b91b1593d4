//! Random-access output file for one job.
//!
//! `create_for` sizes a `<name>.part` file to the job's total length up front,
//! so every fragment has a slot to be written into in any order. The writer
//! renames it to the final name once the job succeeds. Removing a failed
//! `.part` file is the caller's decision.

mod writer;

pub use writer::StorageWriter;

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::job::DownloadJob;

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// How the `.part` file got its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Empty resource; nothing to reserve.
    Empty,
    /// Blocks reserved with `posix_fallocate`.
    Allocated,
    /// Length set with `set_len`; blocks are allocated on first write.
    Sparse,
}

/// Path for the temp file: appends `.part` to the final path (e.g. `a.flv` → `a.flv.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Create `<final_path>.part`, truncating any leftover from an earlier run,
/// and size it for `job`.
pub fn create_for(final_path: &Path, job: &DownloadJob) -> Result<StorageWriter> {
    let tp = temp_path(final_path);
    let file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tp)
        .with_context(|| format!("failed to create {}", tp.display()))?;
    let how = reserve(&file, job.total_size())
        .with_context(|| format!("failed to size {} to {} bytes", tp.display(), job.total_size()))?;
    tracing::debug!(
        path = %tp.display(),
        size = job.total_size(),
        fragments = job.fragments().len(),
        reservation = ?how,
        "output file ready"
    );
    Ok(StorageWriter::new(file, tp))
}

fn reserve(file: &File, size: u64) -> std::io::Result<Reservation> {
    if size == 0 {
        return Ok(Reservation::Empty);
    }
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        if let Ok(len) = libc::off_t::try_from(size) {
            // SAFETY: the descriptor belongs to `file`, which outlives the call.
            if unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len) } == 0 {
                return Ok(Reservation::Allocated);
            }
        }
    }
    file.set_len(size)?;
    Ok(Reservation::Sparse)
}
