//! First-error-wins barrier shared by all workers of a job.
//!
//! The first published error is terminal; later ones are dropped. Checking the
//! barrier is a single atomic load so workers can poll it between fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::DownloadError;

#[derive(Debug, Default)]
pub struct ErrorBarrier {
    tripped: AtomicBool,
    error: Mutex<Option<DownloadError>>,
}

impl ErrorBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `err` if no error was stored before. Returns true if this call won.
    pub fn publish(&self, err: DownloadError) -> bool {
        if self
            .tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(error = %err, "dropping error, barrier already tripped");
            return false;
        }
        tracing::warn!(error = %err, "job failed");
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
        true
    }

    /// True once any error has been published.
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Take the stored error, leaving the barrier tripped.
    pub fn take(&self) -> Option<DownloadError> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
