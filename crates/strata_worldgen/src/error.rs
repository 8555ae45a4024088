//! # Generation Error Types
//!
//! Everything that can make a generation request fail. Rejection of a
//! concurrent request is not an error: see `GenerationStatus::Busy`.

use strata_catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur while generating or querying the world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldGenError {
    /// The catalog could not be built or loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A level outside `0..depth` was addressed.
    #[error("level {level} out of range (catalog depth {depth})")]
    LevelOutOfRange {
        /// Requested level.
        level: u32,
        /// Catalog depth.
        depth: u32,
    },

    /// No biome could be drawn for a level.
    #[error("no biome available for level {0}")]
    NoBiomeForLevel(u32),

    /// Invalid generator configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(String),

    /// One or more tasks of a pass panicked.
    #[error("{failed} task(s) panicked during pass {pass}")]
    TaskPanicked {
        /// Name of the pass.
        pass: &'static str,
        /// Number of panicked tasks.
        failed: usize,
    },

    /// The worker pool stopped accepting or reporting jobs.
    #[error("worker pool closed")]
    PoolClosed,
}

/// Result type for generation operations.
pub type WorldGenResult<T> = Result<T, WorldGenError>;
