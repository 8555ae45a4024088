//! Population: the last pass. Spawns mobs and freezes the sub-region.

use std::sync::Arc;

use rand::Rng;
use strata_core::Region;

use super::{PassContext, PassRng, RegionPass};
use crate::error::WorldGenResult;
use crate::mob::MobInstance;

/// Occasionally spawns one mob of every type native to a cell's biome, then
/// marks every cell of the sub-region initialized so later smoothing leaves
/// it alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct Populate;

impl RegionPass for Populate {
    fn name(&self) -> &'static str {
        "populate"
    }

    fn process(&self, ctx: &PassContext, sub_region: Region, rng: &mut PassRng) -> WorldGenResult<()> {
        let catalog = ctx.catalog();
        let mut spawned = 0usize;

        for coord in sub_region.coords(ctx.level) {
            let Some(cell) = ctx.store.read_terrain(coord) else {
                continue;
            };
            if cell.initialized || !ctx.store.is_passable(coord) {
                continue;
            }
            if !rng.gen_bool(ctx.config.mob_spawn_chance) {
                continue;
            }
            for mob_type in catalog.mobs_for_biome(&cell.biome.name) {
                let mob = MobInstance::spawn(coord, Arc::clone(mob_type), &ctx.config, rng);
                ctx.store.append_mob(mob);
                spawned += 1;
            }
        }

        for coord in sub_region.coords(ctx.level) {
            ctx.store.mark_initialized(coord);
        }
        if spawned > 0 {
            tracing::trace!(level = ctx.level, ?sub_region, spawned, "mobs spawned");
        }
        Ok(())
    }
}
