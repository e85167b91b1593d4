//! Worker loop: claim, fetch, hand off, repeat.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::state::JobState;
use crate::fetch::{BufferPool, FragmentFetcher};
use crate::segmenter::{Fragment, FragmentState};
use crate::sequencer::Completion;

/// Everything one worker thread needs.
pub(super) struct Worker {
    pub id: usize,
    pub fragments: Arc<[Fragment]>,
    pub state: Arc<JobState>,
    pub fetcher: Arc<dyn FragmentFetcher>,
    pub pool: Arc<BufferPool>,
    pub tx: Sender<Completion>,
}

impl Worker {
    /// Drain the fragment queue until it is empty or the job fails.
    pub(super) fn run(self) {
        let id = self.id;
        loop {
            if self.state.barrier().is_tripped() {
                tracing::debug!(worker = id, "job failed, worker exiting");
                return;
            }
            let Some(index) = self.state.claim() else {
                tracing::debug!(worker = id, "no fragments left, worker exiting");
                return;
            };
            let fragment = self.fragments[index];
            self.state.set_state(index, FragmentState::Fetching);
            tracing::debug!(
                worker = id,
                fragment = index,
                begin = fragment.begin,
                end = fragment.end,
                "fetching fragment"
            );

            let buf = self.pool.acquire();
            let payload = match self.fetcher.fetch(&fragment, buf) {
                Ok(p) => p,
                Err(e) => {
                    self.state.set_state(index, FragmentState::Failed);
                    self.state.barrier().publish(e);
                    return;
                }
            };

            if self.state.barrier().is_tripped() {
                tracing::debug!(worker = id, fragment = index, "job failed, dropping fetched fragment");
                self.pool.release(payload);
                return;
            }
            self.state.set_state(index, FragmentState::Ready);
            if self.tx.send(Completion { fragment, payload }).is_err() {
                // Sequencer is gone; nothing left to deliver to.
                return;
            }
        }
    }
}
