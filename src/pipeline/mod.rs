//! Ordered parallel frame production.
//!
//! Workers render index-tagged tasks out of order; a dedicated encoder thread
//! reorders results and drains them to the sink strictly in input order.

/// Block-run partitioning and render tasks.
pub mod runs;

use std::collections::HashMap;
use std::sync::mpsc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::compose::draw::FrameRGBA;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{UniflashError, UniflashResult};
use runs::RenderTask;

/// Cap on buffered out-of-order frames awaiting their turn.
const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Threading and chunking controls for the pipeline.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOpts {
    /// Worker thread count; `None` uses available hardware parallelism.
    pub threads: Option<usize>,
    /// Task submission chunk size; bounds in-flight memory.
    pub chunk_size: usize,
    /// Bounded channel capacity between workers and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            threads: None,
            chunk_size: 64,
            channel_capacity: 4,
        }
    }
}

/// Pipeline counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames delivered to the sink.
    pub frames_encoded: u64,
}

#[derive(Debug)]
struct FrameMsg {
    idx: u64,
    frame: FrameRGBA,
}

/// Render every task through `produce` and stream the frames, in input
/// order, into `sink`.
///
/// Workers complete out of order; the encoder thread buffers early arrivals
/// and only releases frames contiguous with the last emitted index. Any
/// worker or sink failure stops submission, aborts the sink, and becomes the
/// pipeline's terminal error.
pub fn run_pipeline<F>(
    tasks: &[RenderTask],
    cfg: SinkConfig,
    opts: &PipelineOpts,
    produce: F,
    sink: &mut dyn FrameSink,
) -> UniflashResult<PipelineStats>
where
    F: Fn(&RenderTask) -> UniflashResult<FrameRGBA> + Sync,
{
    if tasks.is_empty() {
        return Err(UniflashError::config("empty input sequence"));
    }

    let total = tasks.len() as u64;
    let cap = opts.channel_capacity.max(1);
    let bytes_per_frame = (cfg.width as u64)
        .saturating_mul(cfg.height as u64)
        .saturating_mul(4)
        .max(1);
    let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
    let chunk_size = (normalized_chunk_size(opts.chunk_size).min(max_chunk_by_mem) as usize)
        .min(tasks.len());

    let pool = build_thread_pool(opts.threads)?;
    info!(total, chunk_size, threads = pool.current_num_threads(), "starting frame pipeline");

    std::thread::scope(|scope| -> UniflashResult<PipelineStats> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
        let sink_ref: &mut dyn FrameSink = sink;

        // Encoder thread: the sink's single writer. Returns `false` when the
        // channel disconnected early (producer failure) after aborting the
        // sink.
        let enc = scope.spawn(move || -> UniflashResult<bool> {
            if let Err(e) = sink_ref.begin(cfg) {
                sink_ref.abort();
                return Err(e);
            }

            let mut next = 0u64;
            let mut pending = HashMap::<u64, FrameRGBA>::new();
            while next < total {
                if let Some(frame) = pending.remove(&next) {
                    if let Err(e) = sink_ref.push_frame(FrameIndex(next), &frame) {
                        sink_ref.abort();
                        return Err(e);
                    }
                    next += 1;
                    continue;
                }

                let Ok(msg) = rx.recv() else {
                    sink_ref.abort();
                    return Ok(false);
                };
                pending.insert(msg.idx, msg.frame);

                while let Some(frame) = pending.remove(&next) {
                    if let Err(e) = sink_ref.push_frame(FrameIndex(next), &frame) {
                        sink_ref.abort();
                        return Err(e);
                    }
                    next += 1;
                    if next >= total {
                        break;
                    }
                }
            }

            if let Err(e) = sink_ref.end() {
                sink_ref.abort();
                return Err(e);
            }
            Ok(true)
        });

        let produce_res: UniflashResult<()> = (|| {
            for chunk in tasks.chunks(chunk_size) {
                debug!(
                    start = chunk[0].index,
                    len = chunk.len(),
                    "submitting task chunk"
                );
                pool.install(|| {
                    chunk.par_iter().try_for_each(|task| -> UniflashResult<()> {
                        let frame = produce(task)?;
                        tx.send(FrameMsg {
                            idx: task.index as u64,
                            frame,
                        })
                        .map_err(|_| {
                            UniflashError::encode("encoder thread is not accepting frames")
                        })
                    })
                })?;
            }
            Ok(())
        })();

        drop(tx);
        let enc_res = enc
            .join()
            .map_err(|_| UniflashError::encode("encoder thread panicked"))?;

        // A sink failure is the terminal error even though workers observe it
        // as a refused send; a worker failure surfaces as `produce_res` with
        // the encoder reporting a clean early disconnect.
        let completed = enc_res?;
        produce_res?;
        if !completed {
            return Err(UniflashError::encode(
                "encoder stopped before all frames were delivered",
            ));
        }

        info!(frames = total, "frame pipeline finished");
        Ok(PipelineStats {
            frames_encoded: total,
        })
    })
}

fn build_thread_pool(threads: Option<usize>) -> UniflashResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(UniflashError::config("pipeline 'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| UniflashError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 { 1 } else { chunk_size as u64 }
}
