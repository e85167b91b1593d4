//! Fragment lifecycle states.

/// Where a fragment is in its lifecycle.
///
/// `Pending → Fetching → Ready → Written`, or `Fetching → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FragmentState {
    Pending = 0,
    Fetching = 1,
    /// Payload fetched and handed to the sequencer, not yet in the sink.
    Ready = 2,
    Written = 3,
    Failed = 4,
}

impl FragmentState {
    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            1 => FragmentState::Fetching,
            2 => FragmentState::Ready,
            3 => FragmentState::Written,
            4 => FragmentState::Failed,
            _ => FragmentState::Pending,
        }
    }
}
