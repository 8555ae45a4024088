//! # Neighbourhood Reports
//!
//! A report samples a rectangle of one level and tallies how often each
//! terrain and biome occurs, tracking the most frequent of each as it goes.
//! Every smoothing pass is driven by "what does the majority around me look
//! like"; this is that question.
//!
//! Reports are built fresh on every call. They are never cached, because the
//! cells they read are being rewritten by concurrent tasks.

use std::collections::HashMap;
use std::sync::Arc;

use strata_catalog::{BiomeType, TerrainType};
use strata_core::Region;

use crate::store::SpatialStore;

/// The most frequent value seen so far and how often it was seen.
#[derive(Clone, Debug)]
pub struct Leader<T> {
    /// Occurrences of `value`.
    pub count: u32,
    /// The leading definition.
    pub value: Arc<T>,
}

/// Name-keyed occurrence counts with a running leader.
#[derive(Clone, Debug)]
pub struct Tally<T> {
    counts: HashMap<Arc<str>, u32>,
    leader: Option<Leader<T>>,
}

impl<T> Default for Tally<T> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            leader: None,
        }
    }
}

impl<T> Tally<T> {
    /// Counts one occurrence of `value`.
    ///
    /// The leader changes only when `eligible` and the new count is strictly
    /// greater, so ties keep whichever value got there first.
    pub fn record(&mut self, name: &Arc<str>, value: &Arc<T>, eligible: bool) {
        let count = self.counts.entry(Arc::clone(name)).or_insert(0);
        *count += 1;
        let count = *count;

        if eligible && self.leader.as_ref().map_or(true, |l| count > l.count) {
            self.leader = Some(Leader {
                count,
                value: Arc::clone(value),
            });
        }
    }

    /// Occurrences of `name`; zero if never seen.
    #[must_use]
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// The current leader.
    #[must_use]
    pub const fn leader(&self) -> Option<&Leader<T>> {
        self.leader.as_ref()
    }

    /// Number of distinct names seen.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Iterates `(name, count)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, u32)> {
        self.counts.iter().map(|(name, count)| (name, *count))
    }
}

/// Terrain and biome tallies of one sampled rectangle.
#[derive(Clone, Debug)]
pub struct NeighborhoodReport {
    /// Sampled level.
    pub level: u32,
    /// Sampled rectangle.
    pub region: Region,
    /// Existing cells visited.
    pub cells_seen: u32,
    terrains: Tally<TerrainType>,
    biomes: Tally<BiomeType>,
}

impl NeighborhoodReport {
    /// Samples every `stride`-th cell of `region` on `level` in each axis.
    ///
    /// Missing cells are skipped. The biome leader only considers biomes
    /// valid on `level`.
    #[must_use]
    pub fn sample(store: &SpatialStore, level: u32, region: Region, stride: u32) -> Self {
        let catalog = store.catalog();
        let mut report = Self {
            level,
            region,
            cells_seen: 0,
            terrains: Tally::default(),
            biomes: Tally::default(),
        };

        store.scan_cells(level, region, stride, |cell| {
            report.cells_seen += 1;
            report
                .terrains
                .record(&cell.terrain.name, &cell.terrain, true);
            let valid = catalog.biome_exists_on_level(&cell.biome.name, level);
            report.biomes.record(&cell.biome.name, &cell.biome, valid);
        });
        report
    }

    /// Samples the square of `radius` around `(x, y)`.
    #[must_use]
    pub fn around(store: &SpatialStore, level: u32, x: i32, y: i32, radius: u32, stride: u32) -> Self {
        Self::sample(store, level, Region::around(x, y, radius), stride)
    }

    /// Terrain tallies.
    #[must_use]
    pub const fn terrains(&self) -> &Tally<TerrainType> {
        &self.terrains
    }

    /// Biome tallies.
    #[must_use]
    pub const fn biomes(&self) -> &Tally<BiomeType> {
        &self.biomes
    }

    /// Occurrences of terrain `name`.
    #[must_use]
    pub fn terrain_count(&self, name: &str) -> u32 {
        self.terrains.count(name)
    }

    /// Occurrences of biome `name`.
    #[must_use]
    pub fn biome_count(&self, name: &str) -> u32 {
        self.biomes.count(name)
    }

    /// The most frequent terrain.
    #[must_use]
    pub fn majority_terrain(&self) -> Option<&Arc<TerrainType>> {
        self.terrains.leader().map(|l| &l.value)
    }

    /// The most frequent biome valid on the sampled level.
    #[must_use]
    pub fn majority_biome(&self) -> Option<&Arc<BiomeType>> {
        self.biomes.leader().map(|l| &l.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strata_catalog::TypeCatalog;
    use strata_core::Coord;

    #[test]
    fn test_ties_keep_first_leader() {
        let a: Arc<str> = "a".into();
        let b: Arc<str> = "b".into();
        let va = Arc::new(TerrainType::new("a"));
        let vb = Arc::new(TerrainType::new("b"));

        let mut tally: Tally<TerrainType> = Tally::default();
        for (name, value) in [(&a, &va), (&b, &vb), (&a, &va), (&b, &vb), (&a, &va), (&b, &vb)] {
            tally.record(name, value, true);
        }

        assert_eq!(tally.count("a"), 3);
        assert_eq!(tally.count("b"), 3);
        let leader = tally.leader().unwrap();
        assert_eq!(&*leader.value.name, "a");
        assert_eq!(leader.count, 3);

        tally.record(&b, &vb, true);
        assert_eq!(&*tally.leader().unwrap().value.name, "b");
    }

    #[test]
    fn test_missing_names_read_zero_without_insert() {
        let tally: Tally<TerrainType> = Tally::default();
        assert_eq!(tally.count("nothing"), 0);
        assert_eq!(tally.distinct(), 0);
        assert!(tally.leader().is_none());
    }

    #[test]
    fn test_ineligible_values_never_lead() {
        let x: Arc<str> = "x".into();
        let vx = Arc::new(BiomeType::new("x", 0, 0));
        let mut tally: Tally<BiomeType> = Tally::default();
        tally.record(&x, &vx, false);
        tally.record(&x, &vx, false);
        assert_eq!(tally.count("x"), 2);
        assert!(tally.leader().is_none());
    }

    #[test]
    fn test_sample_with_stride() {
        let catalog = Arc::new(
            TypeCatalog::builder(1)
                .biome(BiomeType::new("meadow", 0, 0).with_terrain("grass", 3).with_terrain("dirt", 1))
                .terrain(TerrainType::new("grass"))
                .terrain(TerrainType::new("dirt"))
                .build()
                .unwrap(),
        );
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let maps = catalog.type_maps();
        let meadow = Arc::clone(&maps.biomes["meadow"]);

        for (x, y) in Region::new(0, 0, 5, 5).cells() {
            let name = if x % 2 == 0 && y % 2 == 0 { "dirt" } else { "grass" };
            store
                .write_terrain(Coord::new(0, x, y), &meadow, &maps.terrains[name], &mut rng)
                .unwrap();
        }

        let full = NeighborhoodReport::sample(&store, 0, Region::new(0, 0, 5, 5), 1);
        assert_eq!(full.cells_seen, 25);
        assert_eq!(full.terrain_count("dirt"), 9);
        assert_eq!(full.terrain_count("grass"), 16);
        assert_eq!(&*full.majority_terrain().unwrap().name, "grass");
        assert_eq!(&*full.majority_biome().unwrap().name, "meadow");

        let sparse = NeighborhoodReport::sample(&store, 0, Region::new(0, 0, 5, 5), 2);
        assert_eq!(sparse.cells_seen, 9);
        assert_eq!(sparse.terrain_count("grass"), 0);
        assert_eq!(&*sparse.majority_terrain().unwrap().name, "dirt");

        let outside = NeighborhoodReport::around(&store, 0, 50, 50, 3, 1);
        assert_eq!(outside.cells_seen, 0);
        assert!(outside.majority_biome().is_none());
    }
}
