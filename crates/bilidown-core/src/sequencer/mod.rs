//! OutputSequencer: turns out-of-order fragment completions into correct output.
//!
//! The sequencer is the only code that touches the sink. Workers hand it
//! completed fragments over a channel; it either writes them at their offset
//! (positional sink) or buffers them until every lower index has been written
//! (sequential sink). The error barrier is checked before each write, so
//! nothing reaches the sink after the job has failed.

mod sink;

pub use sink::{OutputSink, PositionalSink};

use std::collections::BTreeMap;

use crate::barrier::ErrorBarrier;
use crate::error::DownloadError;
use crate::fetch::BufferPool;
use crate::segmenter::Fragment;

/// A fetched fragment and its payload.
#[derive(Debug)]
pub struct Completion {
    pub fragment: Fragment,
    pub payload: Vec<u8>,
}

/// Outcome of one [`OutputSequencer::accept`] call.
#[derive(Debug, Default)]
pub struct Flush {
    /// Fragments written by this call, in write order.
    pub written: Vec<Fragment>,
    /// Write failure that ended the flush chain. Fragments in `written` reached
    /// the sink before it.
    pub error: Option<DownloadError>,
}

impl Flush {
    pub fn into_result(self) -> Result<Vec<Fragment>, DownloadError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.written),
        }
    }
}

/// `'s` is the caller's sink borrow; `'a` covers the job-local barrier and pool.
pub struct OutputSequencer<'s, 'a> {
    sink: OutputSink<'s>,
    barrier: &'a ErrorBarrier,
    pool: Option<&'a BufferPool>,
    /// Ready fragments waiting for lower indices (sequential sinks only).
    pending: BTreeMap<usize, Completion>,
    /// Next index the sequential sink is waiting for.
    flush_cursor: usize,
    written: usize,
    bytes_written: u64,
}

impl<'s, 'a> OutputSequencer<'s, 'a> {
    pub fn new(sink: OutputSink<'s>, barrier: &'a ErrorBarrier) -> Self {
        Self {
            sink,
            barrier,
            pool: None,
            pending: BTreeMap::new(),
            flush_cursor: 0,
            written: 0,
            bytes_written: 0,
        }
    }

    /// Return written payload buffers to `pool` for reuse.
    pub fn with_pool(mut self, pool: &'a BufferPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Accept a Ready fragment and write whatever it unblocks. `written` is
    /// empty if the fragment was buffered or the job has already failed.
    pub fn accept(&mut self, completion: Completion) -> Flush {
        let mut flush = Flush::default();
        if self.barrier.is_tripped() {
            self.discard(completion);
            return flush;
        }
        match self.sink {
            OutputSink::Positional(_) => {
                let fragment = completion.fragment;
                match self.write(completion) {
                    Ok(()) => flush.written.push(fragment),
                    Err(e) => flush.error = Some(e),
                }
            }
            OutputSink::Sequential(_) => {
                let index = completion.fragment.index;
                if index != self.flush_cursor {
                    tracing::trace!(fragment = index, waiting_for = self.flush_cursor, "buffering fragment");
                    self.pending.insert(index, completion);
                    return flush;
                }
                let mut next = Some(completion);
                while let Some(c) = next {
                    if self.barrier.is_tripped() {
                        self.discard(c);
                        break;
                    }
                    let fragment = c.fragment;
                    if let Err(e) = self.write(c) {
                        flush.error = Some(e);
                        break;
                    }
                    flush.written.push(fragment);
                    self.flush_cursor += 1;
                    next = self.pending.remove(&self.flush_cursor);
                }
            }
        }
        flush
    }

    /// Flush a sequential sink. Positional sinks need no finishing here.
    pub fn finish(&mut self) -> Result<(), DownloadError> {
        let last = self.flush_cursor.saturating_sub(1);
        if let OutputSink::Sequential(w) = &mut self.sink {
            w.flush().map_err(|source| DownloadError::Io {
                fragment: last,
                source,
            })?;
        }
        Ok(())
    }

    /// Fragments written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Fragments buffered while waiting for a gap to fill.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Index of the next fragment a sequential sink is waiting for.
    pub fn flush_cursor(&self) -> usize {
        self.flush_cursor
    }

    fn write(&mut self, completion: Completion) -> Result<(), DownloadError> {
        let Completion { fragment, payload } = completion;
        let res = match &mut self.sink {
            OutputSink::Positional(sink) => sink.write_at(fragment.begin, &payload),
            OutputSink::Sequential(w) => w.write_all(&payload),
        };
        if let Err(source) = res {
            return Err(DownloadError::Io {
                fragment: fragment.index,
                source,
            });
        }
        self.written += 1;
        self.bytes_written += payload.len() as u64;
        tracing::debug!(fragment = fragment.index, offset = fragment.begin, "fragment written");
        if let Some(pool) = self.pool {
            pool.release(payload);
        }
        Ok(())
    }

    fn discard(&mut self, completion: Completion) {
        tracing::debug!(fragment = completion.fragment.index, "discarding fragment after failure");
        if let Some(pool) = self.pool {
            pool.release(completion.payload);
        }
    }
}
