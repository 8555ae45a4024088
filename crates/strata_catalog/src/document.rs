//! # Catalog Documents
//!
//! TOML form of a catalog. Documents are parsed into plain serde structs and
//! then fed through [`CatalogBuilder`], so a file gets exactly the same
//! validation as a catalog assembled in code.
//!
//! ```toml
//! depth = 2
//!
//! [[biome]]
//! name = "meadow"
//! min_depth = 0
//! max_depth = 0
//! clusters = true
//! terrains = [{ name = "grass", weight = 4 }]
//!
//! [[terrain]]
//! name = "grass"
//! objects = [{ name = "flower" }]
//!
//! [[object]]
//! name = "flower"
//! biomes = ["meadow"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use strata_core::Direction;

use crate::catalog::{CatalogBuilder, TypeCatalog};
use crate::error::{CatalogError, CatalogResult};
use crate::types::{AnimationTable, BiomeType, MobType, ObjectType, TerrainType};
use crate::weighted::WeightedTable;

/// Catalog shipped with the engine (surface, caves, deep levels).
const BUNDLED_CATALOG: &str = include_str!("../data/bundled_catalog.toml");

const fn default_weight() -> u32 {
    1
}

const fn default_frequency() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct WeightedName {
    name: String,
    #[serde(default = "default_weight")]
    weight: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnimationDoc {
    frame_ms: u32,
    /// Frame lists keyed by lowercase facing name.
    frames: BTreeMap<String, Vec<String>>,
}

impl AnimationDoc {
    fn into_table(self, owner: &str) -> CatalogResult<AnimationTable> {
        let mut table = AnimationTable {
            frames: BTreeMap::new(),
            frame_ms: self.frame_ms,
        };
        for (facing, frames) in self.frames {
            let direction = Direction::from_name(&facing).ok_or_else(|| {
                CatalogError::InvalidConfig(format!("{owner}: unknown facing {facing:?}"))
            })?;
            table.frames.insert(direction, frames);
        }
        Ok(table)
    }
}

#[derive(Debug, Deserialize)]
struct BiomeDoc {
    name: String,
    #[serde(default)]
    min_depth: u32,
    #[serde(default)]
    max_depth: u32,
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    impassable: bool,
    #[serde(default)]
    clusters: bool,
    #[serde(default)]
    terrains: Vec<WeightedName>,
    #[serde(default)]
    animation: AnimationDoc,
}

#[derive(Debug, Deserialize)]
struct TerrainDoc {
    name: String,
    #[serde(default)]
    impassable: bool,
    #[serde(default)]
    clusters: bool,
    #[serde(default = "default_frequency")]
    object_frequency: f64,
    #[serde(default)]
    objects: Vec<WeightedName>,
    #[serde(default)]
    animation: AnimationDoc,
}

#[derive(Debug, Deserialize)]
struct PlaceableDoc {
    name: String,
    #[serde(default)]
    impassable: bool,
    #[serde(default)]
    biomes: Vec<String>,
    #[serde(default)]
    animation: AnimationDoc,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    depth: u32,
    #[serde(default, rename = "biome")]
    biomes: Vec<BiomeDoc>,
    #[serde(default, rename = "terrain")]
    terrains: Vec<TerrainDoc>,
    #[serde(default, rename = "object")]
    objects: Vec<PlaceableDoc>,
    #[serde(default, rename = "mob")]
    mobs: Vec<PlaceableDoc>,
}

fn weighted(names: Vec<WeightedName>) -> WeightedTable {
    WeightedTable::from_entries(names.into_iter().map(|n| (n.name, n.weight)))
}

impl CatalogDocument {
    fn into_builder(self) -> CatalogResult<CatalogBuilder> {
        let mut builder = CatalogBuilder::new(self.depth);

        for doc in self.biomes {
            let mut biome = BiomeType::new(doc.name, doc.min_depth, doc.max_depth)
                .with_weight(doc.weight)
                .clustering(doc.clusters);
            biome.impassable = doc.impassable;
            biome.terrains = weighted(doc.terrains);
            biome.animation = doc.animation.into_table(&biome.name)?;
            builder = builder.biome(biome);
        }

        for doc in self.terrains {
            let mut terrain = TerrainType::new(doc.name)
                .clustering(doc.clusters)
                .impassable(doc.impassable)
                .with_object_frequency(doc.object_frequency);
            terrain.objects = weighted(doc.objects);
            terrain.animation = doc.animation.into_table(&terrain.name)?;
            builder = builder.terrain(terrain);
        }

        for doc in self.objects {
            let animation = doc.animation.into_table(&doc.name)?;
            let mut object = ObjectType::new(doc.name)
                .impassable(doc.impassable)
                .with_animation(animation);
            object.biomes = doc.biomes.into_iter().map(Into::into).collect();
            builder = builder.object(object);
        }

        for doc in self.mobs {
            let animation = doc.animation.into_table(&doc.name)?;
            let mut mob = MobType::new(doc.name)
                .impassable(doc.impassable)
                .with_animation(animation);
            mob.biomes = doc.biomes.into_iter().map(Into::into).collect();
            builder = builder.mob(mob);
        }

        Ok(builder)
    }
}

impl TypeCatalog {
    /// Parses and validates a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML, or any build error.
    pub fn from_toml_str(text: &str) -> CatalogResult<Self> {
        let document: CatalogDocument =
            toml::from_str(text).map_err(|e| CatalogError::InvalidConfig(e.to_string()))?;
        document.into_builder()?.build()
    }

    /// Reads, parses and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`TypeCatalog::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The catalog bundled with the engine.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled file itself is broken.
    pub fn bundled() -> CatalogResult<Self> {
        Self::from_toml_str(BUNDLED_CATALOG)
    }
}
