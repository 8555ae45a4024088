//! # STRATA Catalog
//!
//! Read-only definitions of everything the world generator can place.
//!
//! ## Design Principles
//!
//! 1. **Validated once** - Dangling names and impossible depth ranges are
//!    rejected when the catalog is built, never discovered mid-generation
//! 2. **Shared, not copied** - Definitions live behind `Arc` and cells point at them
//! 3. **External configuration** - Balance data lives in TOML files
//!
//! ## Core Components
//!
//! - `TypeCatalog`: biome, terrain, object and mob tables plus a per-level
//!   biome index
//! - `CatalogBuilder`: assembles and validates a catalog in code
//! - `WeightedTable`: weighted name list used for every random draw
//!
//! ## Example
//!
//! ```rust
//! use strata_catalog::{BiomeType, TerrainType, TypeCatalog};
//!
//! let catalog = TypeCatalog::builder(1)
//!     .biome(BiomeType::new("meadow", 0, 0).with_terrain("grass", 1))
//!     .terrain(TerrainType::new("grass"))
//!     .build()
//!     .unwrap();
//!
//! assert!(catalog.biome_exists_on_level("meadow", 0));
//! assert!(!catalog.biome_exists_on_level("meadow", 1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod document;
pub mod error;
pub mod types;
pub mod weighted;

pub use catalog::{CatalogBuilder, TypeCatalog, TypeMaps};
pub use error::{CatalogError, CatalogResult};
pub use types::{AnimationTable, BiomeType, MobType, ObjectType, TerrainType};
pub use weighted::{WeightedEntry, WeightedTable};
