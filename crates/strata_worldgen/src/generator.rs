//! # World Generator
//!
//! The façade the rest of a game talks to. It owns the store, the pass
//! pipeline and the processor, and lets at most one chunk generation run at
//! a time.
//!
//! ## Re-entrancy
//!
//! ```text
//!   generate_chunk ──> generating? ── yes ──> Busy (store untouched)
//!                          │
//!                          no
//!                          ▼
//!                 set flag ─> stage A ─> stage B ─> clear flag ─> Completed
//! ```
//!
//! A rejected request is not queued. The flag is cleared by a guard, so a
//! failed generation never wedges the generator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use strata_catalog::TypeCatalog;
use strata_core::{Coord, Direction, Region, Volume, WorldSeed};

use crate::config::GeneratorConfig;
use crate::error::WorldGenResult;
use crate::mob::{self, MobId, MobSimulation, MoveOutcome};
use crate::passes::{population_stage, terrain_stage, Pass};
use crate::processor::{ChunkProcessor, ProcessStats};
use crate::store::{BiomeCell, RangeCounts, SpatialStore, TerrainCell, WorldObjectInstance};

/// What one completed generation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    /// The generated volume.
    pub volume: Volume,
    /// Seed of this run.
    pub seed: WorldSeed,
    /// Pass and task totals.
    pub stats: ProcessStats,
    /// Terrain cells in the store afterwards.
    pub cells: usize,
    /// World objects in the store afterwards.
    pub objects: usize,
    /// Mobs in the store afterwards.
    pub mobs: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Result of a [`WorldGenerator::generate_chunk`] request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationStatus {
    /// The chunk was generated.
    Completed(GenerationSummary),
    /// Another generation was in flight; nothing was done.
    Busy,
}

impl GenerationStatus {
    /// True for [`GenerationStatus::Busy`].
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Clears the generating flag when dropped.
struct GeneratingGuard<'a>(&'a Mutex<bool>);

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = false;
    }
}

/// Chunk generation façade over one world.
#[derive(Debug)]
pub struct WorldGenerator {
    config: Arc<GeneratorConfig>,
    store: Arc<SpatialStore>,
    processor: ChunkProcessor,
    seed: WorldSeed,
    runs: AtomicU64,
    generating: Mutex<bool>,
    terrain_stage: Vec<Pass>,
    population_stage: Vec<Pass>,
}

impl WorldGenerator {
    /// Creates a generator over an empty store.
    ///
    /// Without a configured seed a random one is drawn.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad configuration and `WorkerSpawn` if
    /// the worker pool cannot start.
    pub fn new(catalog: Arc<TypeCatalog>, config: GeneratorConfig) -> WorldGenResult<Self> {
        Self::with_stages(catalog, config, terrain_stage(), population_stage())
    }

    /// Creates a generator that runs `terrain` then `population` instead of
    /// the standard pass lists.
    ///
    /// # Errors
    ///
    /// Same as [`WorldGenerator::new`].
    pub fn with_stages(
        catalog: Arc<TypeCatalog>,
        config: GeneratorConfig,
        terrain: Vec<Pass>,
        population: Vec<Pass>,
    ) -> WorldGenResult<Self> {
        config.validate()?;
        let seed = WorldSeed::new(config.seed.unwrap_or_else(rand::random));
        let config = Arc::new(config);
        let processor = ChunkProcessor::new(Arc::clone(&config))?;

        tracing::info!(
            "World generator ready: seed {}, {} workers, depth {}",
            seed.value(),
            processor.worker_count(),
            catalog.depth()
        );

        Ok(Self {
            store: Arc::new(SpatialStore::new(catalog)),
            config,
            processor,
            seed,
            runs: AtomicU64::new(0),
            generating: Mutex::new(false),
            terrain_stage: terrain,
            population_stage: population,
        })
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    /// Generates `volume`: terrain placement and smoothing, then objects and
    /// mobs.
    ///
    /// Returns [`GenerationStatus::Busy`] without touching the store if a
    /// generation is already running.
    ///
    /// # Errors
    ///
    /// Returns `LevelOutOfRange` for levels outside the catalog, or the
    /// first task failure of a pass. Cells written before the failure stay.
    pub fn generate_chunk(&self, volume: &Volume) -> WorldGenResult<GenerationStatus> {
        let Some(_guard) = self.try_begin() else {
            tracing::warn!("Chunk generation rejected: another generation is running");
            return Ok(GenerationStatus::Busy);
        };

        let run = self.runs.fetch_add(1, Ordering::Relaxed);
        let seed = self.seed.derive(run);
        let started = Instant::now();
        tracing::info!(
            "Generating chunk {:?} levels {:?} (run {}, seed {})",
            volume.region,
            volume.levels,
            run,
            seed.value()
        );

        let stats = self.processor.multi_process(
            &self.store,
            volume,
            &self.terrain_stage,
            &self.population_stage,
            seed,
        )?;

        let summary = GenerationSummary {
            volume: volume.clone(),
            seed,
            stats,
            cells: self.store.cell_count(),
            objects: self.store.object_count(),
            mobs: self.store.mob_count(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Chunk generated in {:?}: {} passes ({} skipped), {} tasks, {} cells, {} objects, {} mobs",
            summary.elapsed,
            stats.passes_run,
            stats.passes_skipped,
            stats.tasks,
            summary.cells,
            summary.objects,
            summary.mobs
        );
        Ok(GenerationStatus::Completed(summary))
    }

    fn try_begin(&self) -> Option<GeneratingGuard<'_>> {
        let mut generating = self.generating.lock();
        if *generating {
            return None;
        }
        *generating = true;
        Some(GeneratingGuard(&self.generating))
    }

    /// True while a generation is running.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        *self.generating.lock()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// See [`SpatialStore::is_passable`].
    #[must_use]
    pub fn is_passable(&self, coord: Coord) -> bool {
        self.store.is_passable(coord)
    }

    /// Turns or steps a mob, see [`mob::move_mob`].
    pub fn move_mob(&self, id: MobId, direction: Direction) -> MoveOutcome {
        mob::move_mob(&self.store, id, direction, self.config.tile_size)
    }

    /// Terrain cells of `region` at `level`.
    #[must_use]
    pub fn tiles_in_range(&self, level: u32, region: Region) -> Vec<TerrainCell> {
        self.store.tiles_in_range(level, region)
    }

    /// Biome cells of `region` at `level`.
    #[must_use]
    pub fn biomes_in_range(&self, level: u32, region: Region) -> Vec<BiomeCell> {
        self.store.biomes_in_range(level, region)
    }

    /// World objects of `region` at `level`.
    #[must_use]
    pub fn objects_in_range(&self, level: u32, region: Region) -> Vec<WorldObjectInstance> {
        self.store.objects_in_range(level, region)
    }

    /// Per-name counts over `region` at `level`.
    #[must_use]
    pub fn counts_in_range(&self, level: u32, region: Region) -> RangeCounts {
        self.store.counts_in_range(level, region)
    }

    /// The world store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<SpatialStore> {
        &self.store
    }

    /// The catalog.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        self.store.catalog()
    }

    /// The configuration in use.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Root seed of this generator.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// A mob simulation on this generator's tile size.
    #[must_use]
    pub fn simulation(&self) -> MobSimulation {
        MobSimulation::new(self.config.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_catalog::{BiomeType, TerrainType};

    fn generator(seed: u64) -> WorldGenerator {
        let catalog = TypeCatalog::builder(1)
            .biome(BiomeType::new("meadow", 0, 0).with_terrain("grass", 1))
            .terrain(TerrainType::new("grass"))
            .build()
            .unwrap();
        let mut config = GeneratorConfig::seeded(seed);
        config.worker_count = 2;
        WorldGenerator::new(Arc::new(catalog), config).unwrap()
    }

    #[test]
    fn test_busy_request_leaves_store_untouched() {
        let gen = generator(1);
        *gen.generating.lock() = true;
        assert!(gen.is_generating());

        let status = gen.generate_chunk(&Volume::single_level(0, Region::new(0, 0, 10, 10))).unwrap();
        assert!(status.is_busy());
        assert_eq!(gen.store().cell_count(), 0);
        assert!(gen.is_generating(), "a rejected request must not clear the flag");
    }

    #[test]
    fn test_flag_cleared_after_success_and_failure() {
        let gen = generator(2);
        let status = gen.generate_chunk(&Volume::single_level(0, Region::new(0, 0, 5, 5))).unwrap();
        assert!(!status.is_busy());
        assert!(!gen.is_generating());

        assert!(gen.generate_chunk(&Volume::single_level(3, Region::new(0, 0, 5, 5))).is_err());
        assert!(!gen.is_generating());
    }

    #[test]
    fn test_summary_counts() {
        let gen = generator(3);
        let GenerationStatus::Completed(summary) =
            gen.generate_chunk(&Volume::single_level(0, Region::new(0, 0, 8, 6))).unwrap()
        else {
            panic!("expected completion");
        };
        assert_eq!(summary.cells, 48);
        assert_eq!(summary.objects, 0);
        assert_eq!(summary.stats.levels, 1);
        assert_eq!(summary.seed, gen.seed().derive(0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let catalog = TypeCatalog::builder(1)
            .biome(BiomeType::new("meadow", 0, 0).with_terrain("grass", 1))
            .terrain(TerrainType::new("grass"))
            .build()
            .unwrap();
        let mut config = GeneratorConfig::seeded(1);
        config.sub_region_size = 0;
        assert!(WorldGenerator::new(Arc::new(catalog), config).is_err());
    }
}
