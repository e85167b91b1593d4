//! Error taxonomy for a segmented download job.
//!
//! Every fragment-level failure is terminal for the job: it is published once to
//! the job's [`ErrorBarrier`](crate::barrier::ErrorBarrier) and returned to the
//! caller unchanged. Nothing here is retried.

use thiserror::Error;

/// Why a range response was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Status other than 200 or 206.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u32),
    /// Response carried no `Content-Length` header.
    #[error("response has no Content-Length")]
    MissingContentLength,
    /// Declared `Content-Length` differs from the requested range length.
    #[error("content length mismatch: requested {expected} bytes, server declared {declared}")]
    LengthMismatch { expected: u64, declared: u64 },
    /// Body bytes received differ from the declared length.
    #[error("body length mismatch: expected {expected} bytes, received {received}")]
    BodyLengthMismatch { expected: u64, received: u64 },
}

/// Terminal error of a download job.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Preflight (OPTIONS) probe answered with something other than 200.
    #[error("preflight for fragment {fragment} rejected with HTTP {status}")]
    Auth { fragment: usize, status: u32 },

    /// Connection, DNS, timeout or read failure.
    #[error("transport failure on fragment {fragment}: {source}")]
    Transport {
        fragment: usize,
        #[source]
        source: curl::Error,
    },

    /// Unexpected status or length on the range response.
    #[error("fragment {fragment}: {kind}")]
    Protocol { fragment: usize, kind: ProtocolError },

    /// Sink write failed.
    #[error("writing fragment {fragment} failed: {source}")]
    Io {
        fragment: usize,
        #[source]
        source: std::io::Error,
    },

    /// Job metadata is unusable (e.g. relative URL).
    #[error("invalid download job: {0}")]
    InvalidJob(String),

    #[error("failed to spawn download worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("download worker panicked")]
    WorkerPanicked,

    /// All workers exited without an error but the sink did not receive every fragment.
    #[error("download ended with {flushed} of {total} fragments written")]
    Incomplete { flushed: usize, total: usize },
}

impl DownloadError {
    /// Index of the fragment that caused the error, when there is one.
    pub fn fragment(&self) -> Option<usize> {
        match self {
            DownloadError::Auth { fragment, .. }
            | DownloadError::Transport { fragment, .. }
            | DownloadError::Protocol { fragment, .. }
            | DownloadError::Io { fragment, .. } => Some(*fragment),
            DownloadError::InvalidJob(_)
            | DownloadError::WorkerSpawn(_)
            | DownloadError::WorkerPanicked
            | DownloadError::Incomplete { .. } => None,
        }
    }

    pub(crate) fn protocol(fragment: usize, kind: ProtocolError) -> Self {
        DownloadError::Protocol { fragment, kind }
    }
}
