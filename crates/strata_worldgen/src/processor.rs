//! # Chunk Processor
//!
//! Runs the pass pipeline over a volume, bulk-synchronously:
//!
//! ```text
//!   for level in volume.levels:
//!       sub_regions = partition(region)            // ~25×25 tiles
//!       for pass in stage_a ++ stage_b:
//!           submit one task per sub-region ──> WorkerPool
//!           wait for the whole batch              // barrier
//! ```
//!
//! Every write of one pass is visible to the next. Within a pass, tasks on
//! neighbouring sub-regions may read and write their shared edge in either
//! order.
//!
//! Each task draws from its own `ChaCha8Rng`, seeded from the run seed, the
//! level, the pass position and the sub-region index.

use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use strata_core::{Region, Volume, WorldSeed};

use crate::config::GeneratorConfig;
use crate::error::{WorldGenError, WorldGenResult};
use crate::passes::{CellPass, Pass, PassContext, PassRng, RegionPass};
use crate::pool::{Job, WorkerPool};
use crate::store::SpatialStore;

/// Seed purpose of the sub-region shuffle.
const SHUFFLE_STREAM: u64 = 0x5348_5546;
/// Seed purpose of `should_run` decisions.
const GATE_STREAM: u64 = 0x4741_5445;

/// Totals of one `multi_process` run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessStats {
    /// Levels processed.
    pub levels: u32,
    /// Pass invocations that ran.
    pub passes_run: u32,
    /// Pass invocations skipped by their gate.
    pub passes_skipped: u32,
    /// Tasks executed.
    pub tasks: usize,
}

/// Drives passes across the sub-regions of a volume on a worker pool.
#[derive(Debug)]
pub struct ChunkProcessor {
    pool: WorkerPool,
    config: Arc<GeneratorConfig>,
}

impl ChunkProcessor {
    /// Creates a processor with its own worker pool.
    ///
    /// # Errors
    ///
    /// Returns `WorkerSpawn` if the pool cannot start.
    pub fn new(config: Arc<GeneratorConfig>) -> WorldGenResult<Self> {
        let pool = WorkerPool::new(config.resolved_worker_count())?;
        Ok(Self { pool, config })
    }

    /// Worker threads in the pool.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Sub-regions of `region` in submission order.
    pub fn partition<R: Rng + ?Sized>(&self, region: Region, rng: &mut R) -> Vec<Region> {
        if self.config.shuffle_sub_regions {
            region.subdivide_shuffled(self.config.sub_region_size, rng)
        } else {
            region.subdivide(self.config.sub_region_size)
        }
    }

    /// Runs `stage_a` then `stage_b` over every level of `volume`.
    ///
    /// # Errors
    ///
    /// Returns `LevelOutOfRange` before touching the store if any level lies
    /// outside the catalog, otherwise the first task error of a pass.
    pub fn multi_process(
        &self,
        store: &Arc<SpatialStore>,
        volume: &Volume,
        stage_a: &[Pass],
        stage_b: &[Pass],
        seed: WorldSeed,
    ) -> WorldGenResult<ProcessStats> {
        let depth = store.catalog().depth();
        if volume.levels.end > depth {
            return Err(WorldGenError::LevelOutOfRange {
                level: volume.levels.end - 1,
                depth,
            });
        }

        let mut stats = ProcessStats::default();
        for level in volume.levels.clone() {
            let level_seed = seed.derive(u64::from(level));
            let mut shuffle_rng = PassRng::seed_from_u64(level_seed.derive(SHUFFLE_STREAM).value());
            let sub_regions = self.partition(volume.region, &mut shuffle_rng);
            let ctx = PassContext {
                store: Arc::clone(store),
                config: Arc::clone(&self.config),
                level,
            };

            for (index, pass) in stage_a.iter().chain(stage_b).enumerate() {
                let pass_seed = level_seed.derive(index as u64 + 1);
                let started = Instant::now();

                let tasks = match pass {
                    Pass::Cell(cell_pass) => {
                        let mut gate = PassRng::seed_from_u64(pass_seed.derive(GATE_STREAM).value());
                        if !cell_pass.should_run(&ctx, &mut gate) {
                            tracing::debug!(level, pass = pass.name(), "pass skipped");
                            stats.passes_skipped += 1;
                            continue;
                        }
                        cell_jobs(cell_pass, &ctx, &sub_regions, pass_seed)
                    }
                    Pass::Region(region_pass) => region_jobs(region_pass, &ctx, &sub_regions, pass_seed),
                };

                let batch = self.pool.run_batch(pass.name(), tasks)?;
                stats.passes_run += 1;
                stats.tasks += batch.jobs;
                tracing::debug!(
                    level,
                    pass = pass.name(),
                    sub_regions = batch.jobs,
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "pass complete"
                );
            }
            stats.levels += 1;
        }
        Ok(stats)
    }
}

fn task_rng(pass_seed: WorldSeed, index: usize) -> PassRng {
    PassRng::seed_from_u64(pass_seed.derive(index as u64).value())
}

fn cell_jobs(
    pass: &Arc<dyn CellPass>,
    ctx: &PassContext,
    sub_regions: &[Region],
    pass_seed: WorldSeed,
) -> Vec<Job> {
    sub_regions
        .iter()
        .enumerate()
        .map(|(index, &sub_region)| {
            let pass = Arc::clone(pass);
            let ctx = ctx.clone();
            Box::new(move || -> WorldGenResult<()> {
                let mut rng = task_rng(pass_seed, index);
                pass.select_brush(&ctx, sub_region, &mut rng)?;
                for coord in scan_order(sub_region, ctx.level, &mut rng) {
                    pass.visit(&ctx, coord, &mut rng)?;
                }
                Ok(())
            }) as Job
        })
        .collect()
}

fn region_jobs(
    pass: &Arc<dyn RegionPass>,
    ctx: &PassContext,
    sub_regions: &[Region],
    pass_seed: WorldSeed,
) -> Vec<Job> {
    sub_regions
        .iter()
        .enumerate()
        .map(|(index, &sub_region)| {
            let pass = Arc::clone(pass);
            let ctx = ctx.clone();
            Box::new(move || {
                let mut rng = task_rng(pass_seed, index);
                pass.process(&ctx, sub_region, &mut rng)
            }) as Job
        })
        .collect()
}

/// Cells of `region` row by row, each axis independently reversed at random.
fn scan_order<R: Rng + ?Sized>(region: Region, level: u32, rng: &mut R) -> Vec<strata_core::Coord> {
    let mut xs: Vec<i32> = (region.x..region.x_end()).collect();
    let mut ys: Vec<i32> = (region.y..region.y_end()).collect();
    if rng.gen_bool(0.5) {
        xs.reverse();
    }
    if rng.gen_bool(0.5) {
        ys.reverse();
    }
    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| strata_core::Coord::new(level, x, y)))
        .collect()
}
