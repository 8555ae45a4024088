//! # Spatial Store
//!
//! The shared, level-indexed map every generation task and every frame-loop
//! query goes through. Four logical maps keyed by [`Coord`]:
//!
//! - terrain cells and their mirrored biome cells (one layer, one lock)
//! - per-coordinate world object lists
//! - mobs, indexed both by id and by coordinate
//!
//! ## Consistency
//!
//! Each layer sits behind its own `parking_lot::RwLock`. A mutation holds the
//! write guard of the layer it touches for a single cell's logical operation
//! and nothing longer. Multi-cell operations (the hammer pass rewriting a cell
//! and its four neighbours, a mob stepping from one cell to the next) are a
//! sequence of independent writes, and a concurrent reader may observe the
//! world between two of them. The engine accepts this: workers writing
//! neighbouring sub-regions only ever meet on the seam cells.
//!
//! Layers are always locked in the order terrain, objects, mobs.
//!
//! ## Invariants
//!
//! - A stored biome is valid on its cell's level (invalid writes are
//!   substituted, never stored)
//! - An object list never holds an object that forbids its cell's biome
//! - A coordinate with no terrain is not passable

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use strata_catalog::{AnimationTable, BiomeType, ObjectType, TerrainType, TypeCatalog};
use strata_core::{Coord, Region};

use crate::error::{WorldGenError, WorldGenResult};
use crate::mob::{MobId, MobInstance};

// ============================================================================
// CELLS
// ============================================================================

/// Running animation of a placed cell or object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationTimer {
    /// Time spent in the current frame (ms).
    pub elapsed_ms: u32,
    /// Current frame index.
    pub frame: usize,
    /// Duration of one frame (ms).
    pub frame_ms: u32,
    /// Number of frames in the loop.
    pub frame_count: usize,
}

impl AnimationTimer {
    /// Starts a timer for `table` at a random frame and phase, so that
    /// neighbouring instances do not animate in lock-step.
    ///
    /// Returns `None` for tables that are not animated.
    pub fn start<R: Rng + ?Sized>(table: &AnimationTable, rng: &mut R) -> Option<Self> {
        if !table.is_animated() {
            return None;
        }
        let frame_count = table.frames.values().map(Vec::len).max().unwrap_or(1);
        let frame_ms = table.frame_ms.max(1);
        Some(Self {
            elapsed_ms: rng.gen_range(0..frame_ms),
            frame: rng.gen_range(0..frame_count),
            frame_ms,
            frame_count,
        })
    }

    /// Advances the timer by `dt_ms`, wrapping around the frame loop.
    pub fn advance(&mut self, dt_ms: u32) {
        let total = self.elapsed_ms.saturating_add(dt_ms);
        let frames = (total / self.frame_ms) as usize;
        self.elapsed_ms = total % self.frame_ms;
        self.frame = (self.frame + frames) % self.frame_count.max(1);
    }
}

/// A generated terrain cell.
#[derive(Clone, Debug)]
pub struct TerrainCell {
    /// Position.
    pub coord: Coord,
    /// Owning biome.
    pub biome: Arc<BiomeType>,
    /// Terrain type.
    pub terrain: Arc<TerrainType>,
    /// Animation of animated terrain (water, lava).
    pub animation: Option<AnimationTimer>,
    /// Set by the population pass; smoothing skips initialized cells.
    pub initialized: bool,
}

impl TerrainCell {
    /// Returns true if neither the terrain nor the biome blocks movement.
    #[inline]
    #[must_use]
    pub fn is_passable(&self) -> bool {
        !self.terrain.impassable && !self.biome.impassable
    }
}

/// The biome layer entry mirroring a terrain cell.
#[derive(Clone, Debug)]
pub struct BiomeCell {
    /// Position.
    pub coord: Coord,
    /// Biome at that position.
    pub biome: Arc<BiomeType>,
}

/// A decorative object placed on a cell.
#[derive(Clone, Debug)]
pub struct WorldObjectInstance {
    /// Position.
    pub coord: Coord,
    /// Object type.
    pub object: Arc<ObjectType>,
    /// Running animation, if the type is animated.
    pub animation: Option<AnimationTimer>,
}

impl WorldObjectInstance {
    /// Creates an instance, starting its animation at a random phase.
    pub fn spawn<R: Rng + ?Sized>(coord: Coord, object: Arc<ObjectType>, rng: &mut R) -> Self {
        let animation = AnimationTimer::start(&object.animation, rng);
        Self {
            coord,
            object,
            animation,
        }
    }
}

/// Per-name tallies of a rectangle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeCounts {
    /// Cells per terrain name.
    pub terrains: BTreeMap<Arc<str>, u32>,
    /// Cells per biome name.
    pub biomes: BTreeMap<Arc<str>, u32>,
    /// Objects per object name.
    pub objects: BTreeMap<Arc<str>, u32>,
}

// ============================================================================
// LAYERS
// ============================================================================

#[derive(Default)]
struct TerrainLayer {
    cells: HashMap<Coord, TerrainCell>,
    biomes: HashMap<Coord, BiomeCell>,
}

#[derive(Default)]
struct MobLayer {
    next_id: u64,
    by_id: HashMap<MobId, MobInstance>,
    by_coord: HashMap<Coord, Vec<MobId>>,
}

impl MobLayer {
    fn unlink(&mut self, id: MobId, coord: Coord) {
        if let Some(ids) = self.by_coord.get_mut(&coord) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_coord.remove(&coord);
            }
        }
    }

    fn blocks(&self, coord: Coord) -> bool {
        self.by_coord.get(&coord).is_some_and(|ids| {
            ids.iter()
                .filter_map(|id| self.by_id.get(id))
                .any(|mob| mob.mob_type.impassable)
        })
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Shared spatial state of one world.
///
/// Weakly consistent across cells: see the module documentation.
pub struct SpatialStore {
    catalog: Arc<TypeCatalog>,
    terrain: RwLock<TerrainLayer>,
    objects: RwLock<HashMap<Coord, Vec<WorldObjectInstance>>>,
    mobs: RwLock<MobLayer>,
}

impl std::fmt::Debug for SpatialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialStore")
            .field("depth", &self.catalog.depth())
            .field("cells", &self.cell_count())
            .field("objects", &self.object_count())
            .field("mobs", &self.mob_count())
            .finish()
    }
}

impl SpatialStore {
    /// Creates an empty store backed by `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            terrain: RwLock::new(TerrainLayer::default()),
            objects: RwLock::new(HashMap::new()),
            mobs: RwLock::new(MobLayer::default()),
        }
    }

    /// The catalog every stored reference comes from.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    // ------------------------------------------------------------------------
    // Terrain layer
    // ------------------------------------------------------------------------

    /// Returns the terrain cell at `coord`.
    #[must_use]
    pub fn read_terrain(&self, coord: Coord) -> Option<TerrainCell> {
        self.terrain.read().cells.get(&coord).cloned()
    }

    /// Returns the biome cell at `coord`.
    #[must_use]
    pub fn read_biome(&self, coord: Coord) -> Option<BiomeCell> {
        self.terrain.read().biomes.get(&coord).cloned()
    }

    /// Returns true if a terrain cell exists at `coord`.
    #[must_use]
    pub fn has_terrain(&self, coord: Coord) -> bool {
        self.terrain.read().cells.contains_key(&coord)
    }

    /// Writes the terrain and biome of `coord`.
    ///
    /// If `biome` may not appear on the coordinate's level, a random valid
    /// biome and one of its terrains are written instead. An existing cell
    /// keeps its `initialized` flag. Objects at the coordinate are cleared
    /// when any of them forbids the written biome.
    ///
    /// Returns the biome actually written.
    ///
    /// # Errors
    ///
    /// Returns `LevelOutOfRange` for a level outside the catalog, or
    /// `NoBiomeForLevel` if substitution finds nothing to draw.
    pub fn write_terrain<R: Rng + ?Sized>(
        &self,
        coord: Coord,
        biome: &Arc<BiomeType>,
        terrain: &Arc<TerrainType>,
        rng: &mut R,
    ) -> WorldGenResult<Arc<BiomeType>> {
        let (biome, terrain) = self.substitute(coord, biome, terrain, rng)?;

        {
            let mut layer = self.terrain.write();
            let (initialized, animation) = match layer.cells.get(&coord) {
                Some(old) if Arc::ptr_eq(&old.terrain, &terrain) => (old.initialized, old.animation),
                Some(old) => (old.initialized, AnimationTimer::start(&terrain.animation, rng)),
                None => (false, AnimationTimer::start(&terrain.animation, rng)),
            };
            layer.cells.insert(
                coord,
                TerrainCell {
                    coord,
                    biome: Arc::clone(&biome),
                    terrain,
                    animation,
                    initialized,
                },
            );
            layer.biomes.insert(
                coord,
                BiomeCell {
                    coord,
                    biome: Arc::clone(&biome),
                },
            );
        }

        let mut objects = self.objects.write();
        if let Some(list) = objects.get(&coord) {
            if list.iter().any(|o| !o.object.allows_biome(&biome.name)) {
                tracing::trace!(?coord, biome = %biome.name, "clearing objects forbidden by new biome");
                objects.remove(&coord);
            }
        }

        Ok(biome)
    }

    /// Rewrites the biome of an existing, not yet initialized cell.
    ///
    /// The cell keeps its terrain when `biome` lists it; otherwise a terrain is
    /// drawn from `biome`. Returns false (and writes nothing) if the cell does
    /// not exist, is initialized, or already has `biome`.
    ///
    /// # Errors
    ///
    /// As [`SpatialStore::write_terrain`].
    pub fn reassign_biome<R: Rng + ?Sized>(
        &self,
        coord: Coord,
        biome: &Arc<BiomeType>,
        rng: &mut R,
    ) -> WorldGenResult<bool> {
        let Some(cell) = self.read_terrain(coord) else {
            return Ok(false);
        };
        if cell.initialized || cell.biome.name == biome.name {
            return Ok(false);
        }

        let terrain = if biome.allows_terrain(&cell.terrain.name) {
            cell.terrain
        } else {
            match self.catalog.random_terrain_for(&biome.name, rng) {
                Some(t) => Arc::clone(t),
                None => cell.terrain,
            }
        };
        self.write_terrain(coord, biome, &terrain, rng)?;
        Ok(true)
    }

    /// Sets the `initialized` flag of the cell at `coord`.
    ///
    /// Returns false if there is no cell.
    pub fn mark_initialized(&self, coord: Coord) -> bool {
        self.terrain
            .write()
            .cells
            .get_mut(&coord)
            .map(|cell| cell.initialized = true)
            .is_some()
    }

    fn substitute<R: Rng + ?Sized>(
        &self,
        coord: Coord,
        biome: &Arc<BiomeType>,
        terrain: &Arc<TerrainType>,
        rng: &mut R,
    ) -> WorldGenResult<(Arc<BiomeType>, Arc<TerrainType>)> {
        let depth = self.catalog.depth();
        if coord.level >= depth {
            return Err(WorldGenError::LevelOutOfRange {
                level: coord.level,
                depth,
            });
        }
        if self.catalog.biome_exists_on_level(&biome.name, coord.level) {
            return Ok((Arc::clone(biome), Arc::clone(terrain)));
        }

        let replacement = self
            .catalog
            .random_biome(coord.level, rng)
            .ok_or(WorldGenError::NoBiomeForLevel(coord.level))?;
        let replacement_terrain = self
            .catalog
            .random_terrain_for(&replacement.name, rng)
            .or_else(|| self.catalog.random_terrain(rng))
            .ok_or(WorldGenError::NoBiomeForLevel(coord.level))?;
        tracing::trace!(
            ?coord,
            requested = %biome.name,
            written = %replacement.name,
            "biome not valid on level, substituted"
        );
        Ok((Arc::clone(replacement), Arc::clone(replacement_terrain)))
    }

    /// Calls `visit` for every `stride`-th existing cell of `region` on
    /// `level`, under a single read guard.
    ///
    /// `visit` must not call back into the store.
    pub(crate) fn scan_cells(
        &self,
        level: u32,
        region: Region,
        stride: u32,
        mut visit: impl FnMut(&TerrainCell),
    ) {
        let step = stride.max(1) as usize;
        let layer = self.terrain.read();
        for y in (region.y..region.y_end()).step_by(step) {
            for x in (region.x..region.x_end()).step_by(step) {
                if let Some(cell) = layer.cells.get(&Coord::new(level, x, y)) {
                    visit(cell);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Object layer
    // ------------------------------------------------------------------------

    /// Appends an object to the list at its coordinate.
    pub fn append_world_object(&self, object: WorldObjectInstance) {
        self.objects.write().entry(object.coord).or_default().push(object);
    }

    /// Returns the objects at `coord`.
    #[must_use]
    pub fn objects_at(&self, coord: Coord) -> Vec<WorldObjectInstance> {
        self.objects.read().get(&coord).cloned().unwrap_or_default()
    }

    /// Returns true if any object stands at `coord`.
    #[must_use]
    pub fn has_objects(&self, coord: Coord) -> bool {
        self.objects.read().get(&coord).is_some_and(|list| !list.is_empty())
    }

    /// Advances the animation timers of every object and animated terrain cell.
    pub fn advance_animations(&self, dt_ms: u32) {
        for cell in self.terrain.write().cells.values_mut() {
            if let Some(timer) = cell.animation.as_mut() {
                timer.advance(dt_ms);
            }
        }
        for object in self.objects.write().values_mut().flatten() {
            if let Some(timer) = object.animation.as_mut() {
                timer.advance(dt_ms);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Mob layer
    // ------------------------------------------------------------------------

    /// Stores a mob, assigning it a fresh id.
    pub fn append_mob(&self, mut mob: MobInstance) -> MobId {
        let mut layer = self.mobs.write();
        let id = MobId(layer.next_id);
        layer.next_id += 1;
        mob.id = id;
        layer.by_coord.entry(mob.coord).or_default().push(id);
        layer.by_id.insert(id, mob);
        id
    }

    /// Returns the mobs at `coord`.
    #[must_use]
    pub fn mobs_at(&self, coord: Coord) -> Vec<MobInstance> {
        let layer = self.mobs.read();
        layer
            .by_coord
            .get(&coord)
            .map(|ids| ids.iter().filter_map(|id| layer.by_id.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Returns a copy of the mob with `id`.
    #[must_use]
    pub fn mob(&self, id: MobId) -> Option<MobInstance> {
        self.mobs.read().by_id.get(&id).cloned()
    }

    /// Ids of every stored mob, in ascending order.
    #[must_use]
    pub fn mob_ids(&self) -> Vec<MobId> {
        let mut ids: Vec<MobId> = self.mobs.read().by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Applies `f` to the mob with `id` under the mob write guard.
    ///
    /// `f` must not move the mob (use [`SpatialStore::relocate_mob`]) and
    /// must not call back into the store.
    pub fn update_mob<T>(&self, id: MobId, f: impl FnOnce(&mut MobInstance) -> T) -> Option<T> {
        let mut layer = self.mobs.write();
        let mob = layer.by_id.get_mut(&id)?;
        let coord = mob.coord;
        let out = f(mob);
        mob.coord = coord;
        Some(out)
    }

    /// Removes and returns the mob with `id`.
    pub fn remove_mob(&self, id: MobId) -> Option<MobInstance> {
        let mut layer = self.mobs.write();
        let mob = layer.by_id.remove(&id)?;
        layer.unlink(id, mob.coord);
        Some(mob)
    }

    /// Moves mob `id` from `from` to `to` if `to` is passable.
    ///
    /// Returns the mob's resulting coordinate: `to` on success, otherwise
    /// `from` (destination blocked, or the mob is not at `from`).
    pub fn relocate_mob(&self, id: MobId, from: Coord, to: Coord) -> Coord {
        if !self.ground_passable(to) {
            return from;
        }
        let mut layer = self.mobs.write();
        if layer.blocks(to) {
            return from;
        }
        match layer.by_id.get_mut(&id) {
            Some(mob) if mob.coord == from => mob.coord = to,
            _ => return from,
        }
        layer.unlink(id, from);
        layer.by_coord.entry(to).or_default().push(id);
        to
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns true if `coord` has passable terrain and no impassable object
    /// or mob stands on it.
    #[must_use]
    pub fn is_passable(&self, coord: Coord) -> bool {
        self.ground_passable(coord) && !self.mobs.read().blocks(coord)
    }

    fn ground_passable(&self, coord: Coord) -> bool {
        let terrain_ok = self
            .terrain
            .read()
            .cells
            .get(&coord)
            .is_some_and(TerrainCell::is_passable);
        terrain_ok
            && !self
                .objects
                .read()
                .get(&coord)
                .is_some_and(|list| list.iter().any(|o| o.object.impassable))
    }

    /// Terrain cells of `region` on `level`, row-major.
    #[must_use]
    pub fn tiles_in_range(&self, level: u32, region: Region) -> Vec<TerrainCell> {
        let mut out = Vec::new();
        self.scan_cells(level, region, 1, |cell| out.push(cell.clone()));
        out
    }

    /// Biome cells of `region` on `level`, row-major.
    #[must_use]
    pub fn biomes_in_range(&self, level: u32, region: Region) -> Vec<BiomeCell> {
        let layer = self.terrain.read();
        region
            .coords(level)
            .filter_map(|coord| layer.biomes.get(&coord).cloned())
            .collect()
    }

    /// Objects of `region` on `level`, row-major.
    #[must_use]
    pub fn objects_in_range(&self, level: u32, region: Region) -> Vec<WorldObjectInstance> {
        let layer = self.objects.read();
        region
            .coords(level)
            .filter_map(|coord| layer.get(&coord))
            .flatten()
            .cloned()
            .collect()
    }

    /// Mobs of `region` on `level`.
    #[must_use]
    pub fn mobs_in_range(&self, level: u32, region: Region) -> Vec<MobInstance> {
        let layer = self.mobs.read();
        region
            .coords(level)
            .filter_map(|coord| layer.by_coord.get(&coord))
            .flatten()
            .filter_map(|id| layer.by_id.get(id).cloned())
            .collect()
    }

    /// Terrain, biome and object tallies of `region` on `level`.
    #[must_use]
    pub fn counts_in_range(&self, level: u32, region: Region) -> RangeCounts {
        let mut counts = RangeCounts::default();
        {
            let layer = self.terrain.read();
            for coord in region.coords(level) {
                if let Some(cell) = layer.cells.get(&coord) {
                    *counts.terrains.entry(Arc::clone(&cell.terrain.name)).or_default() += 1;
                }
                if let Some(cell) = layer.biomes.get(&coord) {
                    *counts.biomes.entry(Arc::clone(&cell.biome.name)).or_default() += 1;
                }
            }
        }
        let objects = self.objects.read();
        for object in region.coords(level).filter_map(|c| objects.get(&c)).flatten() {
            *counts.objects.entry(Arc::clone(&object.object.name)).or_default() += 1;
        }
        counts
    }

    /// Number of terrain cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.terrain.read().cells.len()
    }

    /// Number of world objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.read().values().map(Vec::len).sum()
    }

    /// Number of mobs.
    #[must_use]
    pub fn mob_count(&self) -> usize {
        self.mobs.read().by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mob::MobInstance;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strata_catalog::MobType;

    fn catalog() -> Arc<TypeCatalog> {
        Arc::new(
            TypeCatalog::builder(2)
                .biome(BiomeType::new("meadow", 0, 0).with_terrain("grass", 1))
                .biome(BiomeType::new("cavern", 1, 1).with_terrain("stone", 1))
                .terrain(TerrainType::new("grass").with_object("flower", 1))
                .terrain(TerrainType::new("stone"))
                .terrain(TerrainType::new("water").impassable(true))
                .object(ObjectType::new("flower").allowed_in("meadow"))
                .object(ObjectType::new("boulder").impassable(true))
                .mob(MobType::new("rabbit"))
                .mob(MobType::new("golem").impassable(true))
                .build()
                .unwrap(),
        )
    }

    fn get<T>(map: &BTreeMap<Arc<str>, Arc<T>>, name: &str) -> Arc<T> {
        Arc::clone(&map[name])
    }

    #[test]
    fn test_invalid_biome_is_substituted() {
        let catalog = catalog();
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let maps = catalog.type_maps();

        let coord = Coord::new(1, 0, 0);
        let written = store
            .write_terrain(coord, &get(maps.biomes, "meadow"), &get(maps.terrains, "grass"), &mut rng)
            .unwrap();

        assert_eq!(&*written.name, "cavern");
        let cell = store.read_terrain(coord).unwrap();
        assert_eq!(&*cell.biome.name, "cavern");
        assert_eq!(&*cell.terrain.name, "stone");
        assert_eq!(&*store.read_biome(coord).unwrap().biome.name, "cavern");

        let err = store
            .write_terrain(Coord::new(2, 0, 0), &written, &cell.terrain, &mut rng)
            .unwrap_err();
        assert_eq!(err, WorldGenError::LevelOutOfRange { level: 2, depth: 2 });
    }

    #[test]
    fn test_write_preserves_initialized_and_clears_forbidden_objects() {
        let catalog = catalog();
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let maps = catalog.type_maps();
        let coord = Coord::new(0, 3, 3);

        let meadow = get(maps.biomes, "meadow");
        let grass = get(maps.terrains, "grass");
        store.write_terrain(coord, &meadow, &grass, &mut rng).unwrap();
        store.append_world_object(WorldObjectInstance::spawn(coord, get(maps.objects, "flower"), &mut rng));
        assert!(store.mark_initialized(coord));

        store.write_terrain(coord, &meadow, &grass, &mut rng).unwrap();
        assert!(store.read_terrain(coord).unwrap().initialized);
        assert!(store.has_objects(coord), "meadow still allows flowers");

        // Level 0 of this catalog only has meadow; a second catalog provides tundra.
        let tundra = Arc::new(BiomeType::new("tundra", 0, 0).with_terrain("grass", 1));
        let other = TypeCatalog::builder(1)
            .biome((*tundra).clone())
            .terrain(TerrainType::new("grass"))
            .build()
            .unwrap();
        let other_store = SpatialStore::new(Arc::new(other));
        other_store.write_terrain(coord, &tundra, &grass, &mut rng).unwrap();
        other_store.append_world_object(WorldObjectInstance::spawn(coord, get(maps.objects, "flower"), &mut rng));
        other_store.write_terrain(coord, &tundra, &grass, &mut rng).unwrap();
        assert!(!other_store.has_objects(coord), "flower forbids tundra");
    }

    #[test]
    fn test_passability_layers() {
        let catalog = catalog();
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let maps = catalog.type_maps();
        let meadow = get(maps.biomes, "meadow");

        let open = Coord::new(0, 0, 0);
        let water = Coord::new(0, 1, 0);
        let rock = Coord::new(0, 2, 0);
        let guarded = Coord::new(0, 3, 0);
        let nothing = Coord::new(0, 9, 9);

        store.write_terrain(open, &meadow, &get(maps.terrains, "grass"), &mut rng).unwrap();
        store.write_terrain(water, &meadow, &get(maps.terrains, "water"), &mut rng).unwrap();
        store.write_terrain(rock, &meadow, &get(maps.terrains, "grass"), &mut rng).unwrap();
        store.write_terrain(guarded, &meadow, &get(maps.terrains, "grass"), &mut rng).unwrap();
        store.append_world_object(WorldObjectInstance::spawn(rock, get(maps.objects, "boulder"), &mut rng));
        store.append_mob(MobInstance::new(guarded, get(maps.mobs, "golem")));
        store.append_mob(MobInstance::new(open, get(maps.mobs, "rabbit")));

        assert!(store.is_passable(open));
        assert!(!store.is_passable(water));
        assert!(!store.is_passable(rock));
        assert!(!store.is_passable(guarded));
        assert!(!store.is_passable(nothing));
    }

    #[test]
    fn test_relocate_and_remove_mob() {
        let catalog = catalog();
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let maps = catalog.type_maps();
        let meadow = get(maps.biomes, "meadow");
        let grass = get(maps.terrains, "grass");

        let a = Coord::new(0, 0, 0);
        let b = Coord::new(0, 1, 0);
        store.write_terrain(a, &meadow, &grass, &mut rng).unwrap();
        store.write_terrain(b, &meadow, &grass, &mut rng).unwrap();

        let id = store.append_mob(MobInstance::new(a, get(maps.mobs, "rabbit")));
        assert_eq!(store.mob(id).unwrap().id, id);

        assert_eq!(store.relocate_mob(id, b, a), b, "mob is not at b");
        assert_eq!(store.relocate_mob(id, a, Coord::new(0, 5, 5)), a, "no terrain");
        assert_eq!(store.relocate_mob(id, a, b), b);
        assert!(store.mobs_at(a).is_empty());
        assert_eq!(store.mobs_at(b).len(), 1);

        let removed = store.remove_mob(id).unwrap();
        assert_eq!(removed.coord, b);
        assert_eq!(store.mob_count(), 0);
        assert!(store.mobs_at(b).is_empty());
        assert!(store.remove_mob(id).is_none());
    }

    #[test]
    fn test_counts_match_range_lists() {
        let catalog = catalog();
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let maps = catalog.type_maps();
        let meadow = get(maps.biomes, "meadow");

        for (x, y) in Region::new(0, 0, 4, 4).cells() {
            let terrain = if x == y { "water" } else { "grass" };
            store
                .write_terrain(Coord::new(0, x, y), &meadow, &get(maps.terrains, terrain), &mut rng)
                .unwrap();
        }

        let region = Region::new(1, 1, 3, 3);
        let counts = store.counts_in_range(0, region);
        assert_eq!(store.tiles_in_range(0, region).len(), 9);
        assert_eq!(store.biomes_in_range(0, region).len(), 9);
        assert_eq!(counts.terrains["water"], 3);
        assert_eq!(counts.terrains["grass"], 6);
        assert_eq!(counts.biomes["meadow"], 9);
        assert!(counts.objects.is_empty());
    }

    #[test]
    fn test_animation_timer_wraps() {
        let mut timer = AnimationTimer {
            elapsed_ms: 90,
            frame: 2,
            frame_ms: 100,
            frame_count: 3,
        };
        timer.advance(20);
        assert_eq!((timer.frame, timer.elapsed_ms), (0, 10));
        timer.advance(250);
        assert_eq!((timer.frame, timer.elapsed_ms), (2, 60));

        let mut rng = ChaCha8Rng::seed_from_u64(6);
        assert!(AnimationTimer::start(&AnimationTable::default(), &mut rng).is_none());
        let started = AnimationTimer::start(&AnimationTable::uniform(&["a", "b"], 50), &mut rng).unwrap();
        assert!(started.elapsed_ms < 50 && started.frame < 2);
    }
}
