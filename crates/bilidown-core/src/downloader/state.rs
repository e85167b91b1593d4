//! Shared job state: claim cursor, per-fragment states, error barrier.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::barrier::ErrorBarrier;
use crate::segmenter::FragmentState;

/// State shared by all workers and the sequencer for one job.
#[derive(Debug)]
pub struct JobState {
    next_claim: AtomicUsize,
    states: Vec<AtomicU8>,
    barrier: ErrorBarrier,
}

impl JobState {
    pub fn new(fragment_count: usize) -> Self {
        Self {
            next_claim: AtomicUsize::new(0),
            states: (0..fragment_count)
                .map(|_| AtomicU8::new(FragmentState::Pending.as_u8()))
                .collect(),
            barrier: ErrorBarrier::new(),
        }
    }

    pub fn fragment_count(&self) -> usize {
        self.states.len()
    }

    /// Claim the next fragment index, in strictly ascending order across callers.
    /// `None` once every fragment has been handed out.
    pub fn claim(&self) -> Option<usize> {
        let index = self.next_claim.fetch_add(1, Ordering::AcqRel);
        (index < self.states.len()).then_some(index)
    }

    pub fn set_state(&self, index: usize, state: FragmentState) {
        if let Some(slot) = self.states.get(index) {
            slot.store(state.as_u8(), Ordering::Release);
        }
    }

    pub fn state(&self, index: usize) -> Option<FragmentState> {
        self.states
            .get(index)
            .map(|s| FragmentState::from_u8(s.load(Ordering::Acquire)))
    }

    /// Number of fragments currently in `state`.
    pub fn count(&self, state: FragmentState) -> usize {
        self.states
            .iter()
            .filter(|s| s.load(Ordering::Acquire) == state.as_u8())
            .count()
    }

    pub fn barrier(&self) -> &ErrorBarrier {
        &self.barrier
    }
}
