//! # STRATA World Generation
//!
//! Procedural, level-indexed tile worlds generated chunk by chunk on a pool
//! of worker threads.
//!
//! ## Design Principles
//!
//! 1. **One store**: Terrain, objects and mobs live in a single
//!    [`SpatialStore`] shared by every pass and every frame
//! 2. **Bulk-synchronous**: Each pass runs on all sub-regions at once and
//!    finishes before the next one starts
//! 3. **Seeded**: Every random draw comes from a per-task stream derived
//!    from the world seed
//! 4. **Self-correcting writes**: A biome written to a level it does not
//!    belong on is replaced, never reported
//!
//! ## Core Components
//!
//! - `SpatialStore`: cells, objects and mobs keyed by `(level, x, y)`
//! - `NeighborhoodReport`: terrain and biome majorities around a cell
//! - `ChunkProcessor` + `WorkerPool`: one task per sub-region, barrier per pass
//! - `WorldGenerator`: pass pipeline, re-entrancy guard and queries
//! - `MobSimulation`: random walks and the turn-then-step movement machine
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_catalog::TypeCatalog;
//! use strata_core::{Region, Volume};
//! use strata_worldgen::{GenerationStatus, GeneratorConfig, WorldGenerator};
//!
//! let catalog = Arc::new(TypeCatalog::bundled().unwrap());
//! let generator = WorldGenerator::new(catalog, GeneratorConfig::seeded(7)).unwrap();
//!
//! let chunk = Volume::single_level(0, Region::new(0, 0, 30, 30));
//! let status = generator.generate_chunk(&chunk).unwrap();
//! assert!(matches!(status, GenerationStatus::Completed(_)));
//! assert_eq!(generator.tiles_in_range(0, chunk.region).len(), 900);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod generator;
pub mod mob;
pub mod passes;
pub mod pool;
pub mod processor;
pub mod report;
pub mod store;

pub use config::GeneratorConfig;
pub use error::{WorldGenError, WorldGenResult};
pub use generator::{GenerationStatus, GenerationSummary, WorldGenerator};
pub use mob::{
    move_mob, Behavior, MobId, MobInstance, MobOrders, MobSimulation, MoveOutcome, PeriodicSimulator,
    PixelOffset, StepReport,
};
pub use passes::{CellPass, Pass, PassContext, RegionPass};
pub use pool::{BatchStats, WorkerPool};
pub use processor::{ChunkProcessor, ProcessStats};
pub use report::{Leader, NeighborhoodReport, Tally};
pub use store::{
    AnimationTimer, BiomeCell, RangeCounts, SpatialStore, TerrainCell, WorldObjectInstance,
};
