//! # Type Definitions
//!
//! Immutable descriptions of what can exist in the world. Generated cells and
//! instances hold `Arc` references to these, so a definition is shared by
//! every cell that uses it.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_core::Direction;

use crate::weighted::WeightedTable;

/// Sprite frames per facing plus the frame duration.
///
/// The engine only cares whether a type is animated; the frame names are
/// passed through untouched for the renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationTable {
    /// Frame names keyed by facing.
    pub frames: BTreeMap<Direction, Vec<String>>,
    /// Duration of one frame in milliseconds.
    pub frame_ms: u32,
}

impl AnimationTable {
    /// Creates a table with one frame list for every facing.
    #[must_use]
    pub fn uniform(frames: &[&str], frame_ms: u32) -> Self {
        let list: Vec<String> = frames.iter().map(|f| (*f).to_string()).collect();
        Self {
            frames: Direction::ALL.iter().map(|d| (*d, list.clone())).collect(),
            frame_ms,
        }
    }

    /// Returns true if any facing has more than one frame.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.frames.values().any(|f| f.len() > 1)
    }

    /// Frames for `direction`, falling back to `Down`, then to any facing.
    #[must_use]
    pub fn frames_for(&self, direction: Direction) -> &[String] {
        self.frames
            .get(&direction)
            .or_else(|| self.frames.get(&Direction::Down))
            .or_else(|| self.frames.values().next())
            .map_or(&[], Vec::as_slice)
    }
}

/// A biome: a depth-bounded family of terrains.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeType {
    /// Unique name.
    pub name: Arc<str>,
    /// Cells of this biome block movement.
    pub impassable: bool,
    /// Neighbouring cells tend to copy this biome.
    pub clusters: bool,
    /// Shallowest level the biome may appear on (inclusive).
    pub min_depth: u32,
    /// Deepest level the biome may appear on (inclusive).
    pub max_depth: u32,
    /// Weight when drawing a random biome for a level.
    pub weight: u32,
    /// Compatible terrains, weighted.
    pub terrains: WeightedTable,
    /// Sprite frames.
    pub animation: AnimationTable,
}

impl BiomeType {
    /// Creates a biome valid on `min_depth..=max_depth` with weight 1.
    pub fn new(name: impl Into<Arc<str>>, min_depth: u32, max_depth: u32) -> Self {
        Self {
            name: name.into(),
            impassable: false,
            clusters: false,
            min_depth,
            max_depth,
            weight: 1,
            terrains: WeightedTable::new(),
            animation: AnimationTable::default(),
        }
    }

    /// Adds a compatible terrain.
    #[must_use]
    pub fn with_terrain(mut self, terrain: impl Into<Arc<str>>, weight: u32) -> Self {
        self.terrains.push(terrain, weight);
        self
    }

    /// Sets the draw weight for random biome selection.
    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the clustering flag.
    #[must_use]
    pub fn clustering(mut self, clusters: bool) -> Self {
        self.clusters = clusters;
        self
    }

    /// Returns true if the biome may appear on `level`.
    #[inline]
    #[must_use]
    pub const fn spans_level(&self, level: u32) -> bool {
        level >= self.min_depth && level <= self.max_depth
    }

    /// Returns true if `terrain` is one of this biome's terrains.
    #[must_use]
    pub fn allows_terrain(&self, terrain: &str) -> bool {
        self.terrains.contains(terrain)
    }
}

/// A terrain: what a cell is made of.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainType {
    /// Unique name.
    pub name: Arc<str>,
    /// Cells of this terrain block movement.
    pub impassable: bool,
    /// Neighbouring cells tend to copy this terrain.
    pub clusters: bool,
    /// Multiplier applied to the base object spawn chance.
    pub object_frequency: f64,
    /// Objects that may decorate this terrain, weighted.
    pub objects: WeightedTable,
    /// Sprite frames.
    pub animation: AnimationTable,
}

impl TerrainType {
    /// Creates a passable, non-clustering terrain with no objects.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            impassable: false,
            clusters: false,
            object_frequency: 1.0,
            objects: WeightedTable::new(),
            animation: AnimationTable::default(),
        }
    }

    /// Adds a decorating object.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<Arc<str>>, weight: u32) -> Self {
        self.objects.push(object, weight);
        self
    }

    /// Sets the object frequency multiplier.
    #[must_use]
    pub fn with_object_frequency(mut self, frequency: f64) -> Self {
        self.object_frequency = frequency;
        self
    }

    /// Sets the clustering flag.
    #[must_use]
    pub fn clustering(mut self, clusters: bool) -> Self {
        self.clusters = clusters;
        self
    }

    /// Sets the impassable flag.
    #[must_use]
    pub fn impassable(mut self, impassable: bool) -> Self {
        self.impassable = impassable;
        self
    }
}

/// A decorative world object (tree, rock, crystal).
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectType {
    /// Unique name.
    pub name: Arc<str>,
    /// Objects of this type block movement.
    pub impassable: bool,
    /// Biomes the object may stand in. Empty means any biome.
    pub biomes: Vec<Arc<str>>,
    /// Sprite frames.
    pub animation: AnimationTable,
}

impl ObjectType {
    /// Creates a passable object allowed in every biome.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            impassable: false,
            biomes: Vec::new(),
            animation: AnimationTable::default(),
        }
    }

    /// Restricts the object to `biome` (cumulative).
    #[must_use]
    pub fn allowed_in(mut self, biome: impl Into<Arc<str>>) -> Self {
        self.biomes.push(biome.into());
        self
    }

    /// Sets the impassable flag.
    #[must_use]
    pub fn impassable(mut self, impassable: bool) -> Self {
        self.impassable = impassable;
        self
    }

    /// Sets the animation table.
    #[must_use]
    pub fn with_animation(mut self, animation: AnimationTable) -> Self {
        self.animation = animation;
        self
    }

    /// Returns true if the object may stand in `biome`.
    #[must_use]
    pub fn allows_biome(&self, biome: &str) -> bool {
        self.biomes.is_empty() || self.biomes.iter().any(|b| &**b == biome)
    }
}

/// A mob: a creature that wanders the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct MobType {
    /// Unique name.
    pub name: Arc<str>,
    /// Mobs of this type block movement.
    pub impassable: bool,
    /// Biomes the mob spawns in. Empty means any biome.
    pub biomes: Vec<Arc<str>>,
    /// Sprite frames. Animated mobs wander on their own.
    pub animation: AnimationTable,
}

impl MobType {
    /// Creates a passable mob allowed in every biome.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            impassable: false,
            biomes: Vec::new(),
            animation: AnimationTable::default(),
        }
    }

    /// Restricts the mob to `biome` (cumulative).
    #[must_use]
    pub fn allowed_in(mut self, biome: impl Into<Arc<str>>) -> Self {
        self.biomes.push(biome.into());
        self
    }

    /// Sets the impassable flag.
    #[must_use]
    pub fn impassable(mut self, impassable: bool) -> Self {
        self.impassable = impassable;
        self
    }

    /// Sets the animation table.
    #[must_use]
    pub fn with_animation(mut self, animation: AnimationTable) -> Self {
        self.animation = animation;
        self
    }

    /// Returns true if the mob spawns in `biome`.
    #[must_use]
    pub fn allows_biome(&self, biome: &str) -> bool {
        self.biomes.is_empty() || self.biomes.iter().any(|b| &**b == biome)
    }
}
