//! Terrain placement: the first pass, and the only one that creates cells.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use strata_catalog::{BiomeType, TerrainType};
use strata_core::{Coord, Region};

use super::{CellPass, PassContext, PassRng};
use crate::error::{WorldGenError, WorldGenResult};
use crate::report::NeighborhoodReport;
use crate::store::WorldObjectInstance;

/// Fills every unwritten cell, copying a clustering majority from its
/// neighbours or painting with the current brush biome, and occasionally
/// decorates it with an object.
///
/// The brush is shared by every task of the pass, so one sub-region's choice
/// bleeds into whichever sub-region a worker picks up next.
#[derive(Debug, Default)]
pub struct TerrainPlacement {
    brush: Mutex<Option<Arc<BiomeType>>>,
}

impl TerrainPlacement {
    /// Creates the pass with no brush selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current brush biome.
    #[must_use]
    pub fn brush(&self) -> Option<Arc<BiomeType>> {
        self.brush.lock().clone()
    }

    fn brush_for_level(&self, ctx: &PassContext, rng: &mut PassRng) -> WorldGenResult<Arc<BiomeType>> {
        let mut brush = self.brush.lock();
        match brush.as_ref() {
            Some(b) if b.spans_level(ctx.level) => Ok(Arc::clone(b)),
            _ => {
                let fresh = random_biome(ctx, rng)?;
                *brush = Some(Arc::clone(&fresh));
                Ok(fresh)
            }
        }
    }
}

fn random_biome(ctx: &PassContext, rng: &mut PassRng) -> WorldGenResult<Arc<BiomeType>> {
    ctx.catalog()
        .random_biome(ctx.level, rng)
        .cloned()
        .ok_or(WorldGenError::NoBiomeForLevel(ctx.level))
}

/// Per-cell object spawn probability, always a valid `gen_bool` argument.
fn object_chance(ctx: &PassContext, terrain: &TerrainType) -> f64 {
    let chance = ctx.config.object_chance * terrain.object_frequency;
    if chance.is_nan() {
        return 0.0;
    }
    chance.clamp(0.0, 1.0)
}

impl CellPass for TerrainPlacement {
    fn name(&self) -> &'static str {
        "placement"
    }

    fn select_brush(&self, ctx: &PassContext, sub_region: Region, rng: &mut PassRng) -> WorldGenResult<()> {
        let stale = self.brush.lock().as_ref().map_or(true, |b| !b.spans_level(ctx.level));
        if !stale && !rng.gen_bool(ctx.config.brush_update_chance) {
            return Ok(());
        }

        let (x, y) = sub_region.midpoint();
        let report = NeighborhoodReport::around(
            &ctx.store,
            ctx.level,
            x,
            y,
            ctx.config.brush_radius,
            ctx.config.report_stride,
        );
        let next = match report.majority_biome() {
            Some(biome) => Arc::clone(biome),
            None => random_biome(ctx, rng)?,
        };
        tracing::trace!(level = ctx.level, brush = %next.name, "brush selected");
        *self.brush.lock() = Some(next);
        Ok(())
    }

    fn visit(&self, ctx: &PassContext, coord: Coord, rng: &mut PassRng) -> WorldGenResult<()> {
        if ctx.store.has_terrain(coord) {
            return Ok(());
        }
        let catalog = ctx.catalog();

        let report = ctx.report_around(coord, ctx.config.placement_radius);
        let clustered = match (report.majority_terrain(), report.majority_biome()) {
            (Some(terrain), Some(biome)) if terrain.clusters && biome.allows_terrain(&terrain.name) => {
                Some((Arc::clone(biome), Arc::clone(terrain)))
            }
            _ => None,
        };
        let (biome, terrain) = match clustered {
            Some(pair) => pair,
            None => {
                let biome = self.brush_for_level(ctx, rng)?;
                let terrain = catalog
                    .random_terrain_for(&biome.name, rng)
                    .cloned()
                    .ok_or(WorldGenError::NoBiomeForLevel(ctx.level))?;
                (biome, terrain)
            }
        };

        let written = ctx.store.write_terrain(coord, &biome, &terrain, rng)?;

        // Substitution may have swapped the terrain too.
        let Some(cell) = ctx.store.read_terrain(coord) else {
            return Ok(());
        };
        let terrain = cell.terrain;
        if terrain.objects.is_empty() || ctx.store.has_objects(coord) {
            return Ok(());
        }
        if rng.gen_bool(object_chance(ctx, &terrain)) {
            if let Some(object) = catalog.random_object_for(&terrain, &written.name, rng) {
                let object = WorldObjectInstance::spawn(coord, Arc::clone(object), rng);
                ctx.store.append_world_object(object);
            }
        }
        Ok(())
    }
}
