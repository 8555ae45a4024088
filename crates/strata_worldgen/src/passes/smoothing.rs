//! Smoothing passes. Each one nudges biomes towards their local majority and
//! leaves terrain to follow; none of them creates cells.

use std::sync::Arc;

use rand::Rng;
use strata_catalog::BiomeType;
use strata_core::Coord;

use super::{CellPass, PassContext, PassRng};
use crate::error::WorldGenResult;
use crate::store::TerrainCell;

/// The cell at `coord` if it exists and smoothing may still touch it.
fn open_cell(ctx: &PassContext, coord: Coord) -> Option<TerrainCell> {
    ctx.store.read_terrain(coord).filter(|cell| !cell.initialized)
}

fn reassign_all(
    ctx: &PassContext,
    coords: impl IntoIterator<Item = Coord>,
    biome: &Arc<BiomeType>,
    rng: &mut PassRng,
) -> WorldGenResult<()> {
    for coord in coords {
        ctx.store.reassign_biome(coord, biome, rng)?;
    }
    Ok(())
}

// ============================================================================
// FUDGE
// ============================================================================

/// Erodes biome borders: a cell that disagrees with its surroundings either
/// takes the local majority itself or has its four neighbours take it. Only
/// runs on some invocations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fudge;

impl CellPass for Fudge {
    fn name(&self) -> &'static str {
        "fudge"
    }

    fn should_run(&self, ctx: &PassContext, rng: &mut PassRng) -> bool {
        rng.gen_bool(ctx.config.fudge_chance)
    }

    fn visit(&self, ctx: &PassContext, coord: Coord, rng: &mut PassRng) -> WorldGenResult<()> {
        let Some(cell) = open_cell(ctx, coord) else {
            return Ok(());
        };
        let report = ctx.report_around(coord, ctx.config.fudge_radius);
        let Some(majority) = report.majority_biome() else {
            return Ok(());
        };
        if majority.name == cell.biome.name {
            return Ok(());
        }

        if rng.gen_bool(ctx.config.fudge_self_chance) {
            ctx.store.reassign_biome(coord, majority, rng)?;
            Ok(())
        } else {
            reassign_all(ctx, coord.neighbors4(), majority, rng)
        }
    }
}

// ============================================================================
// HAMMER
// ============================================================================

/// Flattens a plus-shaped patch to the local majority, with a small chance
/// of planting a random biome instead so the map does not converge to a
/// single biome.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hammer;

impl CellPass for Hammer {
    fn name(&self) -> &'static str {
        "hammer"
    }

    fn visit(&self, ctx: &PassContext, coord: Coord, rng: &mut PassRng) -> WorldGenResult<()> {
        if open_cell(ctx, coord).is_none() {
            return Ok(());
        }
        let target = if rng.gen_bool(ctx.config.hammer_anomaly_chance) {
            ctx.catalog().random_biome(ctx.level, rng).cloned()
        } else {
            ctx.report_around(coord, ctx.config.hammer_radius)
                .majority_biome()
                .cloned()
        };
        let Some(target) = target else {
            return Ok(());
        };

        let patch = std::iter::once(coord).chain(coord.neighbors4());
        reassign_all(ctx, patch, &target, rng)
    }
}

// ============================================================================
// CLEAN
// ============================================================================

/// Removes specks: a cell whose biome barely occurs around it takes the
/// majority biome.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clean;

impl CellPass for Clean {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn visit(&self, ctx: &PassContext, coord: Coord, rng: &mut PassRng) -> WorldGenResult<()> {
        let Some(cell) = open_cell(ctx, coord) else {
            return Ok(());
        };
        let report = ctx.report_around(coord, ctx.config.clean_radius);
        if report.biome_count(&cell.biome.name) > ctx.config.clean_threshold {
            return Ok(());
        }
        if let Some(majority) = report.majority_biome() {
            ctx.store.reassign_biome(coord, majority, rng)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::config::GeneratorConfig;
    use strata_core::Region;

    #[test]
    fn test_clean_removes_speck() {
        let ctx = fixtures::context(GeneratorConfig::seeded(1));
        let mut rng = fixtures::rng(1);
        fixtures::paint(&ctx, Region::new(0, 0, 7, 7), "meadow");
        fixtures::paint(&ctx, Region::new(3, 3, 1, 1), "desert");

        Clean.visit(&ctx, Coord::new(0, 3, 3), &mut rng).unwrap();
        assert_eq!(fixtures::biome_at(&ctx, 3, 3), "meadow");
        assert_eq!(&*ctx.store.read_terrain(Coord::new(0, 3, 3)).unwrap().terrain.name, "grass");
    }

    #[test]
    fn test_clean_keeps_large_patch() {
        let ctx = fixtures::context(GeneratorConfig::seeded(2));
        let mut rng = fixtures::rng(2);
        fixtures::paint(&ctx, Region::new(0, 0, 7, 7), "meadow");
        fixtures::paint(&ctx, Region::new(2, 2, 2, 2), "desert");

        Clean.visit(&ctx, Coord::new(0, 2, 2), &mut rng).unwrap();
        assert_eq!(fixtures::biome_at(&ctx, 2, 2), "desert");
    }

    #[test]
    fn test_hammer_flattens_plus_patch() {
        let mut config = GeneratorConfig::seeded(3);
        config.hammer_anomaly_chance = 0.0;
        let ctx = fixtures::context(config);
        let mut rng = fixtures::rng(3);
        fixtures::paint(&ctx, Region::new(0, 0, 7, 7), "meadow");
        fixtures::paint(&ctx, Region::new(2, 3, 3, 1), "desert");
        fixtures::paint(&ctx, Region::new(3, 2, 1, 3), "desert");

        Hammer.visit(&ctx, Coord::new(0, 3, 3), &mut rng).unwrap();
        for (x, y) in [(3, 3), (2, 3), (4, 3), (3, 2), (3, 4)] {
            assert_eq!(fixtures::biome_at(&ctx, x, y), "meadow", "({x}, {y})");
        }
    }

    #[test]
    fn test_hammer_anomaly_plants_level_biome() {
        let mut config = GeneratorConfig::seeded(8);
        config.hammer_anomaly_chance = 1.0;
        let patch = [(3, 3), (2, 3), (4, 3), (3, 4)];
        let mut planted_desert = 0;

        for seed in 0..64 {
            let ctx = fixtures::context(config.clone());
            let mut rng = fixtures::rng(seed);
            fixtures::paint(&ctx, Region::new(0, 0, 7, 7), "meadow");
            assert!(ctx.store.mark_initialized(Coord::new(0, 3, 2)));

            Hammer.visit(&ctx, Coord::new(0, 3, 3), &mut rng).unwrap();
            let planted = fixtures::biome_at(&ctx, 3, 3);
            assert!(
                ctx.catalog().biome(&planted).is_some_and(|b| b.spans_level(0)),
                "{planted} is not a level 0 biome"
            );
            for (x, y) in patch {
                assert_eq!(fixtures::biome_at(&ctx, x, y), planted, "({x}, {y})");
            }
            assert_eq!(fixtures::biome_at(&ctx, 3, 2), "meadow");

            if planted == "desert" {
                planted_desert += 1;
                let terrain = ctx.store.read_terrain(Coord::new(0, 3, 3)).unwrap().terrain;
                assert_eq!(&*terrain.name, "sand");
            }
        }
        // The whole neighbourhood is meadow, so desert can only come from the
        // anomaly draw.
        assert!(planted_desert > 0);
    }

    #[test]
    fn test_smoothing_skips_initialized_and_missing_cells() {
        let mut config = GeneratorConfig::seeded(4);
        config.hammer_anomaly_chance = 0.0;
        config.fudge_self_chance = 1.0;
        let ctx = fixtures::context(config);
        let mut rng = fixtures::rng(4);
        fixtures::paint(&ctx, Region::new(0, 0, 3, 3), "meadow");
        fixtures::paint(&ctx, Region::new(1, 1, 1, 1), "desert");
        assert!(ctx.store.mark_initialized(Coord::new(0, 1, 1)));

        Hammer.visit(&ctx, Coord::new(0, 1, 1), &mut rng).unwrap();
        Fudge.visit(&ctx, Coord::new(0, 1, 1), &mut rng).unwrap();
        Clean.visit(&ctx, Coord::new(0, 1, 1), &mut rng).unwrap();
        assert_eq!(fixtures::biome_at(&ctx, 1, 1), "desert");

        // Hammering an edge cell must not create cells outside the painted area.
        Hammer.visit(&ctx, Coord::new(0, 0, 0), &mut rng).unwrap();
        assert_eq!(ctx.store.cell_count(), 9);
    }

    #[test]
    fn test_fudge_converts_self_or_neighbours() {
        let mut config = GeneratorConfig::seeded(5);
        config.fudge_self_chance = 1.0;
        let ctx = fixtures::context(config);
        let mut rng = fixtures::rng(5);
        fixtures::paint(&ctx, Region::new(0, 0, 5, 5), "meadow");
        fixtures::paint(&ctx, Region::new(2, 2, 1, 1), "desert");

        Fudge.visit(&ctx, Coord::new(0, 2, 2), &mut rng).unwrap();
        assert_eq!(fixtures::biome_at(&ctx, 2, 2), "meadow");

        // A desert plus in a meadow: the neighbours give in, the centre is
        // left for a later visit.
        let mut config = GeneratorConfig::seeded(6);
        config.fudge_self_chance = 0.0;
        let ctx = fixtures::context(config);
        fixtures::paint(&ctx, Region::new(0, 0, 5, 5), "meadow");
        fixtures::paint(&ctx, Region::new(1, 2, 3, 1), "desert");
        fixtures::paint(&ctx, Region::new(2, 1, 1, 3), "desert");
        assert!(ctx.store.mark_initialized(Coord::new(0, 2, 1)));

        Fudge.visit(&ctx, Coord::new(0, 2, 2), &mut rng).unwrap();
        assert_eq!(fixtures::biome_at(&ctx, 2, 2), "desert");
        for (x, y) in [(1, 2), (3, 2), (2, 3)] {
            assert_eq!(fixtures::biome_at(&ctx, x, y), "meadow", "({x}, {y})");
        }
        assert_eq!(fixtures::biome_at(&ctx, 2, 1), "desert");

        let mut never = GeneratorConfig::seeded(7);
        never.fudge_chance = 0.0;
        let ctx = fixtures::context(never);
        assert!(!Fudge.should_run(&ctx, &mut rng));
    }
}
