//! Finding the top block of every column in a region.
//!
//! Chunks are decoded in parallel on a pool owned by a [`SurfaceExtractor`].
//! Each worker produces a 16×16 [`ChunkSurface`] per chunk; only the calling
//! thread writes into the [`SurfaceGrid`], and since every chunk covers its
//! own disjoint square of the grid the merge needs no locking.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;

use crate::{
    is_air_id, ChunkDocument, Error, RegionFile, Result, MAX_Y, MIN_Y, REGION_CHUNKS,
};

static NONE_ID: Lazy<Arc<str>> = Lazy::new(|| Arc::from("none"));
static AIR_ID: Lazy<Arc<str>> = Lazy::new(|| Arc::from("air"));

/// The top of one column: the id of the highest non-air block and its world
/// height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceCell {
    pub block_id: Arc<str>,
    pub height: i32,
}

impl SurfaceCell {
    pub fn new(block_id: &str, height: i32) -> Self {
        Self {
            block_id: Arc::from(block_id),
            height,
        }
    }

    /// A column in a chunk that is not in the region.
    pub fn none() -> Self {
        Self {
            block_id: NONE_ID.clone(),
            height: MIN_Y,
        }
    }

    /// A column that was scanned but had nothing but air.
    pub fn air() -> Self {
        Self {
            block_id: AIR_ID.clone(),
            height: MIN_Y,
        }
    }

    pub fn is_none(&self) -> bool {
        &*self.block_id == "none"
    }
}

/// The surface of a single chunk, indexed by local `x`, `z`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSurface {
    cells: Vec<SurfaceCell>,
}

impl ChunkSurface {
    /// A chunk surface with every column set to air.
    pub fn air() -> Self {
        Self {
            cells: vec![SurfaceCell::air(); 16 * 16],
        }
    }

    pub fn get(&self, x: usize, z: usize) -> &SurfaceCell {
        &self.cells[z * 16 + x]
    }

    pub fn set(&mut self, x: usize, z: usize, cell: SurfaceCell) {
        self.cells[z * 16 + x] = cell;
    }
}

/// Square grid of [`SurfaceCell`]s covering `size` chunks along each side.
/// Cells are stored row by row, `z` major.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    width: usize,
    cells: Vec<SurfaceCell>,
}

impl SurfaceGrid {
    /// A grid for `chunks`×`chunks` chunks with every cell unpopulated.
    pub fn new(chunks: usize) -> Self {
        let width = chunks * 16;
        Self {
            width,
            cells: vec![SurfaceCell::none(); width * width],
        }
    }

    /// Side length in blocks.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, x: usize, z: usize) -> &SurfaceCell {
        &self.cells[z * self.width + x]
    }

    pub fn set(&mut self, x: usize, z: usize, cell: SurfaceCell) {
        self.cells[z * self.width + x] = cell;
    }

    pub fn cells(&self) -> &[SurfaceCell] {
        &self.cells
    }

    /// Copy a chunk's surface to its place in the grid. Chunks outside the
    /// grid are ignored.
    pub fn merge_chunk(&mut self, chunk_x: usize, chunk_z: usize, surface: &ChunkSurface) {
        for z in 0..16 {
            for x in 0..16 {
                let (gx, gz) = (chunk_x * 16 + x, chunk_z * 16 + z);
                if gx < self.width && gz < self.width {
                    self.set(gx, gz, surface.get(x, z).clone());
                }
            }
        }
    }
}

/// Tuning for surface extraction. Every field has a default, so partial
/// configuration files deserialize fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Chunks along each side of the area to extract, from the region's
    /// top-left corner. 1 to 32.
    pub region_size: usize,

    /// Scan only every n-th column in x and z, filling the gaps from the
    /// nearest scanned column. 1 to 16.
    pub sample_interval: usize,

    /// Exact worker count. When unset the pool uses every core up to
    /// `max_workers`.
    pub workers: Option<usize>,

    pub max_workers: usize,

    /// Report progress after this many chunks.
    pub progress_every: usize,

    /// Seconds [`SurfaceExtractor::shutdown`] waits for workers to exit.
    pub shutdown_grace_secs: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            region_size: REGION_CHUNKS,
            sample_interval: 1,
            workers: None,
            max_workers: 16,
            progress_every: 8,
            shutdown_grace_secs: 60,
        }
    }
}

impl ExtractOptions {
    pub fn worker_count(&self) -> usize {
        let workers = self.workers.unwrap_or_else(|| {
            let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
            cores.min(self.max_workers)
        });
        workers.max(1)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// A snapshot of how far an extraction has got.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    pub chunks_per_second: f64,
    /// Distinct top block ids seen so far.
    pub distinct_blocks: usize,
}

/// Receives progress reports. Reports come from worker threads, so they can
/// arrive out of order: a report for 16 chunks may land before the one for 8.
pub trait ProgressSink: Sync {
    fn progress(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Sync,
{
    fn progress(&self, progress: Progress) {
        self(progress)
    }
}

/// Summary of a finished extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStats {
    pub chunks: usize,
    /// Chunks that could not be decoded and were left as sentinel cells.
    pub failed_chunks: usize,
    pub elapsed: Duration,
    pub chunks_per_second: f64,
    pub distinct_blocks: usize,
}

fn rate(processed: usize, elapsed: Duration) -> f64 {
    processed as f64 / elapsed.as_secs_f64().max(0.1)
}

/// Decodes the surface of regions using a fixed pool of worker threads.
///
/// The pool lives as long as the extractor, so one extractor can process
/// many regions.
pub struct SurfaceExtractor {
    pool: ThreadPool,
    workers: usize,
    options: ExtractOptions,
    live_threads: Arc<(Mutex<usize>, Condvar)>,
}

impl SurfaceExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self> {
        validate(options.region_size, options.sample_interval)?;

        let workers = options.worker_count();
        let live_threads = Arc::new((Mutex::new(workers), Condvar::new()));
        let on_exit = live_threads.clone();

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mapanvil-surface-{}", i))
            .exit_handler(move |_| {
                let (count, cvar) = &*on_exit;
                let mut count = count.lock().unwrap_or_else(PoisonError::into_inner);
                *count = count.saturating_sub(1);
                cvar.notify_all();
            })
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            workers,
            options,
            live_threads,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Find the top block of every column in the top-left
    /// `region_size`×`region_size` chunks of `region`, scanning every
    /// `sample_interval`-th column.
    pub fn top_blocks(
        &self,
        region: &RegionFile,
        region_size: usize,
        sample_interval: usize,
        progress: &dyn ProgressSink,
    ) -> Result<SurfaceGrid> {
        self.top_blocks_with_stats(region, region_size, sample_interval, progress)
            .map(|(grid, _)| grid)
    }

    pub fn top_blocks_with_stats(
        &self,
        region: &RegionFile,
        region_size: usize,
        sample_interval: usize,
        progress: &dyn ProgressSink,
    ) -> Result<(SurfaceGrid, RenderStats)> {
        validate(region_size, sample_interval)?;

        let start = Instant::now();
        let mut grid = SurfaceGrid::new(region_size);
        let chunks = region.populated_chunks(region_size);
        let total = chunks.len();

        info!(
            "extracting surface of {} chunks ({}x{}, sample interval {})",
            total, region_size, region_size, sample_interval
        );

        if chunks.is_empty() {
            let stats = RenderStats {
                chunks: 0,
                failed_chunks: 0,
                elapsed: start.elapsed(),
                chunks_per_second: 0.0,
                distinct_blocks: 0,
            };
            return Ok((grid, stats));
        }

        let batch_size = (total + self.workers - 1) / self.workers;
        let stride = self.options.progress_every.max(1);
        let processed = AtomicUsize::new(0);
        let found: Mutex<HashSet<Arc<str>>> = Mutex::new(HashSet::new());

        let batches: Vec<Vec<(usize, usize, Option<ChunkSurface>)>> = self.pool.install(|| {
            chunks
                .par_chunks(batch_size)
                .map(|batch| {
                    let mut out = Vec::with_capacity(batch.len());
                    for &(x, z) in batch {
                        let surface = chunk_surface(region, x, z, sample_interval);

                        let distinct = {
                            let mut found = found.lock().unwrap_or_else(PoisonError::into_inner);
                            if let Some(surface) = &surface {
                                found.extend(
                                    surface
                                        .cells
                                        .iter()
                                        .filter(|c| !is_air_id(&c.block_id))
                                        .map(|c| c.block_id.clone()),
                                );
                            }
                            found.len()
                        };

                        let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
                        if n % stride == 0 {
                            progress.progress(Progress {
                                processed: n,
                                total,
                                chunks_per_second: rate(n, start.elapsed()),
                                distinct_blocks: distinct,
                            });
                        }

                        out.push((x, z, surface));
                    }
                    out
                })
                .collect()
        });

        let mut failed = 0;
        for (x, z, surface) in batches.into_iter().flatten() {
            match surface {
                Some(surface) => grid.merge_chunk(x, z, &surface),
                None => failed += 1,
            }
        }

        let elapsed = start.elapsed();
        let stats = RenderStats {
            chunks: total,
            failed_chunks: failed,
            elapsed,
            chunks_per_second: rate(total, elapsed),
            distinct_blocks: found.lock().unwrap_or_else(PoisonError::into_inner).len(),
        };

        info!(
            "extracted {} chunks ({} failed) in {:.2}s, {:.1} chunks/s, {} distinct blocks",
            stats.chunks,
            stats.failed_chunks,
            elapsed.as_secs_f64(),
            stats.chunks_per_second,
            stats.distinct_blocks
        );

        Ok((grid, stats))
    }

    /// Stop the pool and wait up to `grace` for its threads to exit.
    /// Returns false if some were still running when the grace period ran
    /// out. Work already submitted always completes first, a chunk is never
    /// abandoned half decoded.
    pub fn shutdown(self, grace: Duration) -> bool {
        let Self {
            pool, live_threads, ..
        } = self;
        drop(pool);

        let (count, cvar) = &*live_threads;
        let count = count.lock().unwrap_or_else(PoisonError::into_inner);
        let (count, _) = cvar
            .wait_timeout_while(count, grace, |live| *live > 0)
            .unwrap_or_else(PoisonError::into_inner);

        if *count > 0 {
            warn!("{} surface workers still running after {:?}", *count, grace);
        }
        *count == 0
    }
}

fn validate(region_size: usize, sample_interval: usize) -> Result<()> {
    if !(1..=REGION_CHUNKS).contains(&region_size) {
        return Err(Error::InvalidRegionSize(region_size));
    }
    if !(1..=16).contains(&sample_interval) {
        return Err(Error::InvalidSampleInterval(sample_interval));
    }
    Ok(())
}

/// Decode one chunk and scan its surface. Chunks that fail to decode are
/// logged and give `None`, leaving their cells as sentinels.
fn chunk_surface(
    region: &RegionFile,
    x: usize,
    z: usize,
    sample_interval: usize,
) -> Option<ChunkSurface> {
    match region.chunk(x, z) {
        Ok(Some(chunk)) => Some(scan_chunk(&chunk, sample_interval)),
        Ok(None) => None,
        Err(e) => {
            warn!("skipping chunk ({}, {}): {}", x, z, e);
            None
        }
    }
}

/// Scan the sampled columns of `chunk` from the top of the world down.
pub fn scan_chunk(chunk: &ChunkDocument, sample_interval: usize) -> ChunkSurface {
    let step = sample_interval.clamp(1, 16);
    let mut surface = ChunkSurface::air();

    for z in (0..16).step_by(step) {
        for x in (0..16).step_by(step) {
            surface.set(x, z, column_top(chunk, x, z));
        }
    }

    if step > 1 {
        for z in 0..16 {
            for x in 0..16 {
                let (sx, sz) = ((x / step) * step, (z / step) * step);
                if (sx, sz) != (x, z) {
                    let cell = surface.get(sx, sz).clone();
                    surface.set(x, z, cell);
                }
            }
        }
    }

    surface
}

/// The highest non-air block in column `x`, `z`. Blocks that cannot be
/// decoded are skipped so the scan carries on to the next one down.
pub fn column_top(chunk: &ChunkDocument, x: usize, z: usize) -> SurfaceCell {
    for y in (MIN_Y..=MAX_Y).rev() {
        match chunk.block(x, y, z) {
            Ok(Some(block)) if !block.is_air() => return SurfaceCell::new(block.id(), y),
            Ok(_) => {}
            Err(warning) => debug!(
                "chunk ({}, {}) column ({}, {}) at y {}: {}",
                chunk.x_pos(),
                chunk.z_pos(),
                x,
                z,
                y,
                warning
            ),
        }
    }

    SurfaceCell::air()
}
