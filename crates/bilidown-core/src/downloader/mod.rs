//! Core segmented downloader engine.
//!
//! Plans fragments, runs a bounded pool of worker threads that claim fragments
//! in ascending order and fetch them via a [`FragmentFetcher`], and feeds every
//! completion to a single [`OutputSequencer`] running on the caller's thread.
//! The first error stops the job: workers stop claiming, the sequencer stops
//! writing, and `download` returns that error once every worker has exited.

mod state;
mod worker;

pub use state::JobState;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use crate::error::DownloadError;
use crate::fetch::{BufferPool, FetchOptions, FragmentFetcher, RangeFetcher};
use crate::job::DownloadJob;
use crate::progress::ProgressStats;
use crate::segmenter::{Fragment, FragmentState};
use crate::sequencer::{OutputSequencer, OutputSink};

use worker::Worker;

/// Engine tuning for one job.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Worker threads; `None` = number of logical CPUs.
    pub workers: Option<usize>,
    pub fetch: FetchOptions,
    /// Idle payload buffers to keep for reuse; `None` = twice the worker count.
    pub buffer_pool_capacity: Option<usize>,
    /// Receives a snapshot after every write. Never blocks the engine.
    pub progress: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

/// Worker count for `fragment_count` fragments: requested or CPU count, at
/// least 1, never more than there are fragments.
pub fn worker_count(requested: Option<usize>, fragment_count: usize) -> usize {
    let wanted = requested.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    wanted.max(1).min(fragment_count.max(1))
}

/// Downloads `job` over HTTP into `sink`. Blocks until every fragment is
/// written or the first error occurs. On error the sink may hold partial data;
/// discarding it is up to the caller.
pub fn download(
    job: &DownloadJob,
    sink: OutputSink<'_>,
    opts: &EngineOptions,
) -> Result<(), DownloadError> {
    opts.fetch.validate()?;
    let fetcher = Arc::new(RangeFetcher::new(job, opts.fetch));
    download_with(job, fetcher, sink, opts)
}

/// Same as [`download`] with a caller-supplied fetcher.
pub fn download_with(
    job: &DownloadJob,
    fetcher: Arc<dyn FragmentFetcher>,
    sink: OutputSink<'_>,
    opts: &EngineOptions,
) -> Result<(), DownloadError> {
    let fragments: Arc<[Fragment]> = job.fragments().into();
    let total = fragments.len();
    let started = Instant::now();

    if total == 0 {
        tracing::info!(url = job.url(), "empty resource, nothing to fetch");
        report(opts, job, 0, 0, started);
        return Ok(());
    }

    let workers = worker_count(opts.workers, total);
    tracing::info!(
        url = job.url(),
        size = job.total_size(),
        fragments = total,
        workers,
        sequential = sink.is_sequential(),
        "download started"
    );

    let state = Arc::new(JobState::new(total));
    let buffer_len = job.fragment_size().get().min(job.total_size()) as usize;
    let pool = Arc::new(BufferPool::new(
        opts.buffer_pool_capacity.unwrap_or(workers * 2),
        buffer_len,
    ));

    let (tx, rx) = mpsc::channel();
    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let worker = Worker {
            id,
            fragments: Arc::clone(&fragments),
            state: Arc::clone(&state),
            fetcher: Arc::clone(&fetcher),
            pool: Arc::clone(&pool),
            tx: tx.clone(),
        };
        let spawned = std::thread::Builder::new()
            .name(format!("bilidown-worker-{}", id))
            .spawn(move || worker.run());
        match spawned {
            Ok(h) => handles.push(h),
            Err(e) => {
                state.barrier().publish(DownloadError::WorkerSpawn(e));
                break;
            }
        }
    }
    drop(tx);

    let mut sequencer = OutputSequencer::new(sink, state.barrier()).with_pool(&pool);
    // Ends once every worker has dropped its sender.
    for completion in rx {
        let flush = sequencer.accept(completion);
        if !flush.written.is_empty() {
            for f in &flush.written {
                state.set_state(f.index, FragmentState::Written);
            }
            report(opts, job, sequencer.bytes_written(), sequencer.written(), started);
        }
        if let Some(e) = flush.error {
            if let Some(index) = e.fragment() {
                state.set_state(index, FragmentState::Failed);
            }
            state.barrier().publish(e);
        }
    }

    for h in handles {
        if h.join().is_err() {
            state.barrier().publish(DownloadError::WorkerPanicked);
        }
    }

    if let Some(err) = state.barrier().take() {
        tracing::error!(error = %err, written = sequencer.written(), total, "download failed");
        return Err(err);
    }
    sequencer.finish()?;

    let written = sequencer.written();
    if written != total {
        return Err(DownloadError::Incomplete {
            flushed: written,
            total,
        });
    }

    tracing::info!(
        bytes = sequencer.bytes_written(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "download completed"
    );
    Ok(())
}

fn report(opts: &EngineOptions, job: &DownloadJob, bytes_done: u64, fragments_done: usize, started: Instant) {
    if let Some(tx) = &opts.progress {
        let _ = tx.try_send(ProgressStats {
            bytes_done,
            total_bytes: job.total_size(),
            elapsed_secs: started.elapsed().as_secs_f64(),
            fragments_done,
            fragment_count: job.fragments().len(),
        });
    }
}
