//! # Region Generation
//!
//! Generates and populates every chunk of a square region on a pool of
//! worker threads. Each chunk is owned by exactly one worker for both phases,
//! so the output does not depend on the worker count.
//!
//! Chunks reach the sink in completion order; a failing chunk stops the
//! queue and its error is returned once the workers have drained.

use std::collections::BTreeMap;
use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded};

use strata_procedural::{
    Chunk, ChunkCoord, ChunkProvider, ChunkSink, DecorationReport, GenResult, GenerationError,
};

/// Which chunks to generate and how many workers to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionPlan {
    /// Center chunk.
    pub center: ChunkCoord,
    /// Chunks on each side of the center; 0 is just the center.
    pub radius: u32,
    /// Worker threads, at least one.
    pub workers: usize,
}

impl RegionPlan {
    /// A plan around `center` using every available core.
    #[must_use]
    pub fn around(center: ChunkCoord, radius: u32) -> Self {
        let workers = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            center,
            radius,
            workers,
        }
    }

    /// Sets the worker count.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Coordinates of the region, z-major.
    #[must_use]
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let r = self.radius as i32;
        let mut coords = Vec::with_capacity(self.chunk_count());
        for dz in -r..=r {
            for dx in -r..=r {
                coords.push(ChunkCoord::new(self.center.x + dx, self.center.z + dz));
            }
        }
        coords
    }

    /// Number of chunks in the region.
    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        let side = 2 * self.radius as usize + 1;
        side * side
    }
}

/// Totals of a region run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionStats {
    /// Chunks generated and populated.
    pub chunks: usize,
    /// How many chunks each flag was set in.
    pub flags: BTreeMap<String, usize>,
    /// Entity spawn markers recorded.
    pub spawns: usize,
    /// Wall time.
    pub elapsed: Duration,
}

impl RegionStats {
    fn record(&mut self, chunk: &Chunk, report: &DecorationReport) {
        self.chunks += 1;
        self.spawns += chunk.entity_spawns().len();
        for flag in &report.flags {
            *self.flags.entry(flag.clone()).or_default() += 1;
        }
    }

    /// Chunks per second.
    #[must_use]
    pub fn chunks_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.chunks as f64 / secs
        } else {
            0.0
        }
    }
}

type Finished = (ChunkCoord, GenResult<(Chunk, DecorationReport)>);

/// Turns the spawn tally into the number of running workers.
fn workers_started(requested: usize, started: usize, last_error: Option<io::Error>) -> GenResult<usize> {
    if started > 0 {
        return Ok(started);
    }
    Err(GenerationError::NoWorkers {
        requested,
        reason: last_error.map_or_else(|| "nothing was spawned".to_string(), |e| e.to_string()),
    })
}

/// Generates every chunk of `plan` and hands it to `sink`.
///
/// # Errors
///
/// Returns the first pipeline or sink error. Chunks finished before it are
/// already stored. Returns [`GenerationError::NoWorkers`] when no worker
/// thread could be spawned.
pub fn generate_region(
    provider: &ChunkProvider,
    plan: &RegionPlan,
    sink: &mut dyn ChunkSink,
) -> GenResult<RegionStats> {
    let start = Instant::now();
    let coords = plan.coords();
    let workers = plan.workers.clamp(1, coords.len().max(1));

    let (job_tx, job_rx) = unbounded::<ChunkCoord>();
    let (done_tx, done_rx) = bounded::<Finished>(workers * 2);
    for &coord in &coords {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send(coord);
    }
    drop(job_tx);

    tracing::info!(
        center = %plan.center,
        radius = plan.radius,
        chunks = coords.len(),
        workers,
        "generating region"
    );

    let mut stats = RegionStats::default();
    let mut first_error = None;

    let outcome = thread::scope(|scope| -> GenResult<()> {
        let mut started = 0;
        let mut last_error = None;
        for id in 0..workers {
            let jobs = job_rx.clone();
            let done = done_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("worldgen-{id}"))
                .spawn_scoped(scope, move || {
                    for coord in jobs.iter() {
                        if done.send((coord, provider.generate(coord))).is_err() {
                            break;
                        }
                    }
                });
            match spawned {
                Ok(_) => started += 1,
                Err(e) => {
                    tracing::warn!(worker = id, error = %e, "failed to spawn worker");
                    last_error = Some(e);
                }
            }
        }
        drop(done_tx);
        let started = workers_started(workers, started, last_error)?;
        if started < workers {
            tracing::warn!(started, requested = workers, "running with fewer workers");
        }

        for (coord, result) in done_rx.iter() {
            if first_error.is_some() {
                continue;
            }
            let stored = result.and_then(|(chunk, report)| {
                sink.store(&chunk)?;
                stats.record(&chunk, &report);
                Ok(())
            });
            if let Err(e) = stored {
                tracing::warn!(%coord, error = %e, "chunk failed, stopping region");
                while job_rx.try_recv().is_ok() {}
                first_error = Some(e);
            }
        }
        Ok(())
    });

    outcome?;
    if let Some(e) = first_error {
        return Err(e);
    }
    stats.elapsed = start.elapsed();
    tracing::info!(
        chunks = stats.chunks,
        spawns = stats.spawns,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "region complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_procedural::{install_default_populators, MemorySink, WorldConfig, WorldGenerator};

    fn provider(seed: u64) -> ChunkProvider {
        let mut generator = WorldGenerator::new(WorldConfig::with_seed(seed));
        install_default_populators(&mut generator);
        ChunkProvider::new(generator)
    }

    #[test]
    fn test_plan_covers_square() {
        let plan = RegionPlan::around(ChunkCoord::new(10, -3), 2).with_workers(1);
        let coords = plan.coords();
        assert_eq!(coords.len(), 25);
        assert_eq!(plan.chunk_count(), 25);
        assert_eq!(coords[0], ChunkCoord::new(8, -5));
        assert_eq!(coords[24], ChunkCoord::new(12, -1));
    }

    #[test]
    fn test_no_started_worker_is_an_error() {
        let refused = io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached");
        let err = workers_started(4, 0, Some(refused)).expect_err("nothing runs the jobs");
        assert!(matches!(err, GenerationError::NoWorkers { requested: 4, .. }));
        assert!(err.to_string().contains("thread limit reached"));

        assert!(workers_started(1, 0, None).is_err());

        let partial = io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached");
        assert_eq!(workers_started(4, 3, Some(partial)).expect("three workers run"), 3);
    }

    #[test]
    fn test_zero_workers_still_generates() {
        let provider = provider(7);
        let plan = RegionPlan::around(ChunkCoord::new(2, 2), 0).with_workers(0);
        let mut sink = MemorySink::default();
        let stats = generate_region(&provider, &plan, &mut sink).expect("clamped to one worker");
        assert_eq!(stats.chunks, 1);
        assert_eq!(sink.chunks.len(), 1);
    }

    #[test]
    fn test_region_output_independent_of_workers() {
        let provider = provider(42);
        let plan = RegionPlan::around(ChunkCoord::new(0, 0), 1);

        let mut single = MemorySink::default();
        let stats = generate_region(&provider, &plan.with_workers(1), &mut single).expect("region");
        assert_eq!(stats.chunks, 9);

        let mut many = MemorySink::default();
        generate_region(&provider, &plan.with_workers(4), &mut many).expect("region");

        let mut a = single.chunks;
        let mut b = many.chunks;
        a.sort_by_key(|c| (c.coord.x, c.coord.z));
        b.sort_by_key(|c| (c.coord.x, c.coord.z));
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.coord, y.coord);
            assert_eq!(x.blocks(), y.blocks());
            assert!(y.populated);
        }
        println!("{:.1} chunks/s", stats.chunks_per_second());
    }
}
