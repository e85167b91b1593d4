//! Fragment planning and range math.
//!
//! Splits a resource of known size into fixed-size fragments, computes HTTP
//! Range header bounds, and defines the per-fragment lifecycle states.

mod range;
mod state;

pub use range::{fragment_count, plan_fragments, Fragment, DEFAULT_FRAGMENT_SIZE};
pub use state::FragmentState;
