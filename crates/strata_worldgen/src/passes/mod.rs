//! # Generation Passes
//!
//! A chunk is produced by running a fixed list of passes over every
//! sub-region of every level. Two shapes of pass exist:
//!
//! - [`CellPass`]: picks a brush for the sub-region, then visits each of its
//!   cells in a randomly flipped scan order
//! - [`RegionPass`]: handles a whole sub-region in one call
//!
//! ## Pipeline
//!
//! ```text
//!   stage A:  placement (+brush) ─> fudge ─> hammer ─> fudge ─> clean
//!   stage B:  populate (objects/mobs, marks cells initialized)
//! ```
//!
//! Smoothing passes only ever rewrite cells that already exist and are not
//! yet initialized, so neighbour diffusion never grows the map past the
//! requested chunk.

mod placement;
mod populate;
mod smoothing;

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use strata_catalog::TypeCatalog;
use strata_core::{Coord, Region};

use crate::config::GeneratorConfig;
use crate::error::WorldGenResult;
use crate::report::NeighborhoodReport;
use crate::store::SpatialStore;

pub use placement::TerrainPlacement;
pub use populate::Populate;
pub use smoothing::{Clean, Fudge, Hammer};

/// Random stream handed to passes. One per task, seeded from the world seed.
pub type PassRng = ChaCha8Rng;

/// Everything a pass needs for one level of one chunk.
#[derive(Clone, Debug)]
pub struct PassContext {
    /// The shared world.
    pub store: Arc<SpatialStore>,
    /// Generation tunables.
    pub config: Arc<GeneratorConfig>,
    /// Level being generated.
    pub level: u32,
}

impl PassContext {
    /// The catalog behind the store.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &TypeCatalog {
        self.store.catalog()
    }

    /// Report of the square of `radius` around `coord`.
    #[must_use]
    pub fn report_around(&self, coord: Coord, radius: u32) -> NeighborhoodReport {
        NeighborhoodReport::around(
            &self.store,
            self.level,
            coord.x,
            coord.y,
            radius,
            self.config.report_stride,
        )
    }
}

/// A pass that visits every cell of a sub-region.
pub trait CellPass: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Decides once per invocation (per level) whether the pass runs.
    fn should_run(&self, _ctx: &PassContext, _rng: &mut PassRng) -> bool {
        true
    }

    /// Called once per sub-region before its cells are visited.
    ///
    /// # Errors
    ///
    /// Store errors abort the sub-region.
    fn select_brush(&self, _ctx: &PassContext, _sub_region: Region, _rng: &mut PassRng) -> WorldGenResult<()> {
        Ok(())
    }

    /// Processes one cell.
    ///
    /// # Errors
    ///
    /// Store errors abort the sub-region.
    fn visit(&self, ctx: &PassContext, coord: Coord, rng: &mut PassRng) -> WorldGenResult<()>;
}

/// A pass that processes a sub-region as a whole.
pub trait RegionPass: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Processes one sub-region.
    ///
    /// # Errors
    ///
    /// Store errors abort the sub-region.
    fn process(&self, ctx: &PassContext, sub_region: Region, rng: &mut PassRng) -> WorldGenResult<()>;
}

/// One entry of the pipeline.
#[derive(Clone)]
pub enum Pass {
    /// Per-cell pass.
    Cell(Arc<dyn CellPass>),
    /// Whole-sub-region pass.
    Region(Arc<dyn RegionPass>),
}

impl Pass {
    /// Name of the wrapped pass.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cell(pass) => pass.name(),
            Self::Region(pass) => pass.name(),
        }
    }
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cell(pass) => f.debug_tuple("Cell").field(&pass.name()).finish(),
            Self::Region(pass) => f.debug_tuple("Region").field(&pass.name()).finish(),
        }
    }
}

/// The terrain stage: placement with brush, then fudge, hammer, fudge, clean.
#[must_use]
pub fn terrain_stage() -> Vec<Pass> {
    let fudge: Arc<dyn CellPass> = Arc::new(Fudge);
    vec![
        Pass::Cell(Arc::new(TerrainPlacement::new())),
        Pass::Cell(Arc::clone(&fudge)),
        Pass::Cell(Arc::new(Hammer)),
        Pass::Cell(fudge),
        Pass::Cell(Arc::new(Clean)),
    ]
}

/// The population stage: objects and mobs, then cells are initialized.
#[must_use]
pub fn population_stage() -> Vec<Pass> {
    vec![Pass::Region(Arc::new(Populate))]
}
