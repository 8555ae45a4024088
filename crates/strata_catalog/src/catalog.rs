//! # Type Catalog
//!
//! The read-only lookup the generator consumes: four named tables plus a
//! per-level index of which biomes may be drawn at each depth.
//!
//! ## Invariants (checked by [`CatalogBuilder::build`])
//!
//! - Every referenced terrain, object and biome name is defined
//! - Every biome's depth range lies inside `0..depth`
//! - Every terrain's object frequency is finite and non-negative
//! - Every biome has at least one drawable terrain
//! - Every level has at least one drawable biome
//!
//! The last two guarantee that substituting a random valid biome and terrain
//! for an invalid write can always succeed.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;

use crate::error::{CatalogError, CatalogResult};
use crate::types::{BiomeType, MobType, ObjectType, TerrainType};
use crate::weighted::WeightedTable;

/// Borrowed view of the four definition tables.
#[derive(Clone, Copy, Debug)]
pub struct TypeMaps<'a> {
    /// Biomes by name.
    pub biomes: &'a BTreeMap<Arc<str>, Arc<BiomeType>>,
    /// Terrains by name.
    pub terrains: &'a BTreeMap<Arc<str>, Arc<TerrainType>>,
    /// World objects by name.
    pub objects: &'a BTreeMap<Arc<str>, Arc<ObjectType>>,
    /// Mobs by name.
    pub mobs: &'a BTreeMap<Arc<str>, Arc<MobType>>,
}

/// Immutable table of every definition the generator may place.
#[derive(Clone, Debug)]
pub struct TypeCatalog {
    /// Number of levels (`0..depth`).
    depth: u32,
    biomes: BTreeMap<Arc<str>, Arc<BiomeType>>,
    terrains: BTreeMap<Arc<str>, Arc<TerrainType>>,
    objects: BTreeMap<Arc<str>, Arc<ObjectType>>,
    mobs: BTreeMap<Arc<str>, Arc<MobType>>,
    /// Biome draw table for each level.
    levels: Vec<WeightedTable>,
    /// Uniform draw table over every terrain.
    all_terrains: WeightedTable,
}

impl TypeCatalog {
    /// Starts a catalog with `depth` levels.
    #[must_use]
    pub fn builder(depth: u32) -> CatalogBuilder {
        CatalogBuilder::new(depth)
    }

    /// Number of levels.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Borrows the four definition tables.
    #[must_use]
    pub const fn type_maps(&self) -> TypeMaps<'_> {
        TypeMaps {
            biomes: &self.biomes,
            terrains: &self.terrains,
            objects: &self.objects,
            mobs: &self.mobs,
        }
    }

    /// Looks up a biome.
    #[must_use]
    pub fn biome(&self, name: &str) -> Option<&Arc<BiomeType>> {
        self.biomes.get(name)
    }

    /// Looks up a terrain.
    #[must_use]
    pub fn terrain(&self, name: &str) -> Option<&Arc<TerrainType>> {
        self.terrains.get(name)
    }

    /// Looks up a world object.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<&Arc<ObjectType>> {
        self.objects.get(name)
    }

    /// Looks up a mob.
    #[must_use]
    pub fn mob(&self, name: &str) -> Option<&Arc<MobType>> {
        self.mobs.get(name)
    }

    /// Returns true if `name` is a biome that may appear on `level`.
    #[must_use]
    pub fn biome_exists_on_level(&self, name: &str, level: u32) -> bool {
        level < self.depth && self.biomes.get(name).is_some_and(|b| b.spans_level(level))
    }

    /// Iterates the biomes that may appear on `level`, by name.
    pub fn biomes_on_level(&self, level: u32) -> impl Iterator<Item = &Arc<BiomeType>> {
        let level_ok = level < self.depth;
        self.biomes
            .values()
            .filter(move |b| level_ok && b.spans_level(level))
    }

    /// Draws a biome valid on `level`, weighted by biome weight.
    pub fn random_biome<R: Rng + ?Sized>(&self, level: u32, rng: &mut R) -> Option<&Arc<BiomeType>> {
        let name = self.levels.get(level as usize)?.pick(rng)?;
        self.biomes.get(name)
    }

    /// Draws any terrain, uniformly.
    pub fn random_terrain<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Arc<TerrainType>> {
        let name = self.all_terrains.pick(rng)?;
        self.terrains.get(name)
    }

    /// Draws one of `biome`'s terrains by its weights.
    pub fn random_terrain_for<R: Rng + ?Sized>(
        &self,
        biome: &str,
        rng: &mut R,
    ) -> Option<&Arc<TerrainType>> {
        let name = self.biomes.get(biome)?.terrains.pick(rng)?;
        self.terrains.get(name)
    }

    /// Draws an object from `terrain`'s table restricted to objects allowed in
    /// `biome`.
    pub fn random_object_for<R: Rng + ?Sized>(
        &self,
        terrain: &TerrainType,
        biome: &str,
        rng: &mut R,
    ) -> Option<&Arc<ObjectType>> {
        let name = terrain.objects.pick_where(rng, |name| {
            self.objects.get(name).is_some_and(|o| o.allows_biome(biome))
        })?;
        self.objects.get(name)
    }

    /// Iterates the mob types that spawn in `biome`, in name order.
    pub fn mobs_for_biome<'a>(&'a self, biome: &'a str) -> impl Iterator<Item = &'a Arc<MobType>> {
        self.mobs.values().filter(move |m| m.allows_biome(biome))
    }
}

/// Collects definitions and validates them into a [`TypeCatalog`].
#[derive(Clone, Debug, Default)]
pub struct CatalogBuilder {
    depth: u32,
    biomes: Vec<BiomeType>,
    terrains: Vec<TerrainType>,
    objects: Vec<ObjectType>,
    mobs: Vec<MobType>,
}

impl CatalogBuilder {
    /// Creates an empty builder for `depth` levels.
    #[must_use]
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Adds a biome.
    #[must_use]
    pub fn biome(mut self, biome: BiomeType) -> Self {
        self.biomes.push(biome);
        self
    }

    /// Adds a terrain.
    #[must_use]
    pub fn terrain(mut self, terrain: TerrainType) -> Self {
        self.terrains.push(terrain);
        self
    }

    /// Adds a world object.
    #[must_use]
    pub fn object(mut self, object: ObjectType) -> Self {
        self.objects.push(object);
        self
    }

    /// Adds a mob.
    #[must_use]
    pub fn mob(mut self, mob: MobType) -> Self {
        self.mobs.push(mob);
        self
    }

    /// Validates every cross-reference and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant (see module docs).
    pub fn build(self) -> CatalogResult<TypeCatalog> {
        if self.depth == 0 {
            return Err(CatalogError::InvalidConfig(
                "catalog depth must be at least 1".to_string(),
            ));
        }

        let biomes = index("biome", self.biomes, |b| &b.name)?;
        let terrains = index("terrain", self.terrains, |t| &t.name)?;
        let objects = index("object", self.objects, |o| &o.name)?;
        let mobs = index("mob", self.mobs, |m| &m.name)?;

        for biome in biomes.values() {
            if biome.min_depth > biome.max_depth || biome.max_depth >= self.depth {
                return Err(CatalogError::InvalidDepthRange {
                    biome: biome.name.to_string(),
                    min: biome.min_depth,
                    max: biome.max_depth,
                    depth: self.depth,
                });
            }
            if biome.terrains.is_empty() {
                return Err(CatalogError::EmptyTerrainTable(biome.name.to_string()));
            }
            if let Some(missing) = biome.terrains.names().find(|t| !terrains.contains_key(*t)) {
                return Err(CatalogError::UnknownTerrain {
                    biome: biome.name.to_string(),
                    terrain: missing.to_string(),
                });
            }
        }

        for terrain in terrains.values() {
            let frequency = terrain.object_frequency;
            if !frequency.is_finite() || frequency < 0.0 {
                return Err(CatalogError::InvalidObjectFrequency {
                    terrain: terrain.name.to_string(),
                    frequency: frequency.to_string(),
                });
            }
            if let Some(missing) = terrain.objects.names().find(|o| !objects.contains_key(*o)) {
                return Err(CatalogError::UnknownObject {
                    terrain: terrain.name.to_string(),
                    object: missing.to_string(),
                });
            }
        }

        let owners = objects
            .values()
            .map(|o| (format!("object {}", o.name), &o.biomes))
            .chain(mobs.values().map(|m| (format!("mob {}", m.name), &m.biomes)));
        for (owner, allowed) in owners {
            if let Some(missing) = allowed.iter().find(|b| !biomes.contains_key(*b)) {
                return Err(CatalogError::UnknownBiome {
                    owner,
                    biome: missing.to_string(),
                });
            }
        }

        let mut levels = Vec::with_capacity(self.depth as usize);
        for level in 0..self.depth {
            let table = WeightedTable::from_entries(
                biomes
                    .values()
                    .filter(|b| b.spans_level(level))
                    .map(|b| (Arc::clone(&b.name), b.weight)),
            );
            if table.is_empty() {
                return Err(CatalogError::EmptyLevel(level));
            }
            levels.push(table);
        }

        let all_terrains = WeightedTable::from_entries(terrains.keys().map(|n| (Arc::clone(n), 1)));

        Ok(TypeCatalog {
            depth: self.depth,
            biomes,
            terrains,
            objects,
            mobs,
            levels,
            all_terrains,
        })
    }
}

/// Indexes definitions by name, rejecting duplicates.
fn index<T>(
    kind: &'static str,
    defs: Vec<T>,
    name_of: impl Fn(&T) -> &Arc<str>,
) -> CatalogResult<BTreeMap<Arc<str>, Arc<T>>> {
    let mut map = BTreeMap::new();
    for def in defs {
        let name = Arc::clone(name_of(&def));
        if map.contains_key(&name) {
            return Err(CatalogError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        map.insert(name, Arc::new(def));
    }
    Ok(map)
}
