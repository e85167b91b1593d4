//! Output sink capabilities.

use std::io::{self, Write};

/// Sink that accepts writes at explicit byte offsets (e.g. a pre-sized file).
pub trait PositionalSink {
    /// Write all of `data` starting at `offset`.
    fn write_at(&self, offset: u64, data: &[u8]) -> io::Result<()>;
}

#[cfg(unix)]
impl PositionalSink for std::fs::File {
    fn write_at(&self, offset: u64, data: &[u8]) -> io::Result<()> {
        use std::os::unix::fs::FileExt;
        self.write_all_at(data, offset)
    }
}

/// Where a job's bytes go, by capability.
///
/// Positional sinks receive each fragment at its own offset as soon as it
/// arrives. Sequential sinks only append, so fragments are buffered and
/// flushed in index order.
pub enum OutputSink<'a> {
    Positional(&'a dyn PositionalSink),
    Sequential(&'a mut dyn Write),
}

impl OutputSink<'_> {
    pub fn is_sequential(&self) -> bool {
        matches!(self, OutputSink::Sequential(_))
    }
}

impl std::fmt::Debug for OutputSink<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputSink::Positional(_) => f.write_str("OutputSink::Positional"),
            OutputSink::Sequential(_) => f.write_str("OutputSink::Sequential"),
        }
    }
}
