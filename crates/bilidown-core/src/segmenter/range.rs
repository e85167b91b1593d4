//! Fragment type and range planning.

use std::num::NonZeroU64;

/// Default fragment size: 8 MiB.
pub const DEFAULT_FRAGMENT_SIZE: NonZeroU64 = match NonZeroU64::new(8 * 1024 * 1024) {
    Some(n) => n,
    None => unreachable!(),
};

/// A single fragment: byte range `[begin, end]` (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Position in the plan (0-based, dense).
    pub index: usize,
    /// First byte offset.
    pub begin: u64,
    /// Last byte offset.
    pub end: u64,
}

impl Fragment {
    /// Length of this fragment in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.begin + 1
    }

    /// HTTP Range header value: `bytes=begin-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.begin, self.end)
    }
}

/// Number of fragments `plan_fragments` produces: `ceil(total_size / fragment_size)`.
pub fn fragment_count(total_size: u64, fragment_size: NonZeroU64) -> u64 {
    total_size.div_ceil(fragment_size.get())
}

/// Builds the fragment plan for a resource of `total_size` bytes.
///
/// Every fragment but the last is exactly `fragment_size` long; the last one
/// takes the remainder. A size that is an exact multiple of `fragment_size`
/// produces no trailing empty fragment, and a size of 0 produces no fragments.
pub fn plan_fragments(total_size: u64, fragment_size: NonZeroU64) -> Vec<Fragment> {
    let frag = fragment_size.get();
    let count = fragment_count(total_size, fragment_size);

    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let begin = i * frag;
        let end = if i == count - 1 {
            total_size - 1
        } else {
            begin + (frag - 1)
        };
        out.push(Fragment {
            index: i as usize,
            begin,
            end,
        });
    }

    tracing::debug!(total_size, fragment_size = frag, count, "planned fragments");
    out
}
