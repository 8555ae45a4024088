//! # Catalog Error Types
//!
//! Everything that can be wrong with a catalog is caught when it is built.
//! Once a `TypeCatalog` exists, lookups and draws cannot fail on a dangling
//! reference.

use thiserror::Error;

/// Errors raised while building or loading a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Malformed document or invalid top-level setting.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(String),

    /// Two definitions of the same kind share a name.
    #[error("duplicate {kind} definition: {name}")]
    DuplicateName {
        /// Definition kind (`biome`, `terrain`, `object`, `mob`).
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A biome lists a terrain that is not defined.
    #[error("biome {biome} references unknown terrain {terrain}")]
    UnknownTerrain {
        /// The referencing biome.
        biome: String,
        /// The missing terrain.
        terrain: String,
    },

    /// A terrain lists an object that is not defined.
    #[error("terrain {terrain} references unknown object {object}")]
    UnknownObject {
        /// The referencing terrain.
        terrain: String,
        /// The missing object.
        object: String,
    },

    /// An object or mob lists a biome that is not defined.
    #[error("{owner} references unknown biome {biome}")]
    UnknownBiome {
        /// The referencing object or mob.
        owner: String,
        /// The missing biome.
        biome: String,
    },

    /// A biome's depth bounds are inverted or exceed the catalog depth.
    #[error("biome {biome} has invalid depth range {min}..={max} (catalog depth {depth})")]
    InvalidDepthRange {
        /// The offending biome.
        biome: String,
        /// Declared minimum depth.
        min: u32,
        /// Declared maximum depth.
        max: u32,
        /// Number of levels in the catalog.
        depth: u32,
    },

    /// A terrain's object frequency is negative, infinite or NaN.
    #[error("terrain {terrain} has invalid object frequency {frequency}")]
    InvalidObjectFrequency {
        /// The offending terrain.
        terrain: String,
        /// The rejected value, as written.
        frequency: String,
    },

    /// No biome can be drawn on a level.
    #[error("no biome is valid on level {0}")]
    EmptyLevel(u32),

    /// A biome has no drawable terrain.
    #[error("biome {0} has no terrain with positive weight")]
    EmptyTerrainTable(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
