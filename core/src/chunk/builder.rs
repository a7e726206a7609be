use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Instant,
};

use crossbeam_channel::bounded;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    envelope::{bounds, DEFAULT_K},
    error::CodecError,
    grid::{CellId, HexGrid, MAX_RESOLUTION},
};

use super::{ChunkBound, ChunkError, ChunkStat};

/// Options for [`ChunkBoundsBuilder`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Chunk endpoints finer than this resolution are replaced by their
    /// ancestors at this resolution before the range between them is
    /// walked. This bounds the number of cells visited per chunk. It never
    /// goes below a chunk's own file resolution.
    pub base_resolution: u8,

    /// Number of rings each cell in a range is buffered by
    pub k: u32,

    /// Number of worker threads
    pub workers: usize,

    /// Capacity of the job and result queues
    pub queue_size: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            base_resolution: MAX_RESOLUTION,
            k: DEFAULT_K,
            workers: num_cpus::get(),
            queue_size: 64,
        }
    }
}

/// Returned if a build was cancelled before all chunks were processed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("chunk bounds build was cancelled")]
pub struct Cancelled;

/// Computes a [`ChunkBound`] for every [`ChunkStat`] of a file. Chunks are
/// independent of each other and processed by a pool of worker threads.
pub struct ChunkBoundsBuilder<G> {
    grid: G,
    config: BuilderConfig,
}

impl<G: HexGrid> ChunkBoundsBuilder<G> {
    pub fn new(grid: G, config: BuilderConfig) -> Self {
        Self { grid, config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn coarsen(&self, cell: CellId, min_resolution: u8) -> Result<CellId, CodecError> {
        let target = self.config.base_resolution.max(min_resolution);
        if self.grid.resolution(cell)? > target {
            self.grid.parent(cell, target)
        } else {
            Ok(cell)
        }
    }

    /// Computes the bounds of a single chunk
    pub fn build_one(&self, stat: &ChunkStat) -> Result<ChunkBound, ChunkError> {
        let chunk_error = |source| ChunkError {
            file_id: stat.file_id.clone(),
            chunk_id: stat.chunk_id,
            source,
        };

        let hex_min = self
            .coarsen(stat.hex_min, stat.file_resolution)
            .map_err(chunk_error)?;
        let hex_max = self
            .coarsen(stat.hex_max, stat.file_resolution)
            .map_err(chunk_error)?;
        let rect = bounds(
            &self.grid,
            hex_min,
            hex_max,
            stat.file_resolution,
            self.config.k,
        )
        .map_err(chunk_error)?;

        debug!(
            file_id = %stat.file_id,
            chunk_id = stat.chunk_id,
            ?rect,
            "computed chunk bounds"
        );
        Ok(ChunkBound::new(stat.file_id.clone(), stat.chunk_id, rect))
    }

    /// Computes the bounds of all chunks. The results are returned in the
    /// order of the input. A chunk that fails does not affect the others.
    pub fn build<I>(&self, stats: I) -> Vec<Result<ChunkBound, ChunkError>>
    where
        I: IntoIterator<Item = ChunkStat>,
        I::IntoIter: Send,
    {
        let never = AtomicBool::new(false);
        match self.build_cancellable(stats, &never) {
            Ok(results) => results,
            Err(Cancelled) => unreachable!("build cannot be cancelled without a cancel flag"),
        }
    }

    /// Same as [`build`](Self::build) but stops handing out chunks as soon
    /// as `cancel` is set. Chunks already being processed are finished but
    /// their results are discarded. If the flag is raised after the last
    /// chunk has been processed, the complete result is returned.
    pub fn build_cancellable<I>(
        &self,
        stats: I,
        cancel: &AtomicBool,
    ) -> Result<Vec<Result<ChunkBound, ChunkError>>, Cancelled>
    where
        I: IntoIterator<Item = ChunkStat>,
        I::IntoIter: Send,
    {
        let start = Instant::now();
        let stats = stats.into_iter();
        let queue_size = self.config.queue_size.max(1);

        let results = thread::scope(|s| {
            let (job_send, job_recv) = bounded::<(usize, ChunkStat)>(queue_size);
            let (result_send, result_recv) = bounded(queue_size);

            for _ in 0..self.config.workers.max(1) {
                let job_recv = job_recv.clone();
                let result_send = result_send.clone();
                s.spawn(move || {
                    for (i, stat) in job_recv {
                        if cancel.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = self.build_one(&stat);
                        if let Err(err) = &result {
                            warn!(%err, "skipping chunk");
                        }
                        if result_send.send((i, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_recv);
            drop(result_send);

            // yields the number of jobs sent or `None` if it stopped early
            let feeder = s.spawn(move || {
                let mut sent = 0;
                for job in stats.enumerate() {
                    if cancel.load(Ordering::Relaxed) || job_send.send(job).is_err() {
                        return None;
                    }
                    sent += 1;
                }
                Some(sent)
            });

            let results = result_recv.iter().collect::<Vec<_>>();
            (feeder.join().ok().flatten(), results)
        });

        let (sent, mut results) = results;
        if sent != Some(results.len()) {
            return Err(Cancelled);
        }

        results.sort_unstable_by_key(|(i, _)| *i);
        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            chunks = results.len(),
            failed,
            elapsed = ?start.elapsed(),
            "computed chunk bounds"
        );

        Ok(results.into_iter().map(|(_, r)| r).collect())
    }
}
