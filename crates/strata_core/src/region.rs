//! # Regions
//!
//! A `Region` is an axis-aligned, half-open rectangle of cells on one level.
//! Generation work is split by partitioning a chunk-sized region into
//! fixed-size sub-regions, each handled by one worker task.
//!
//! Partition order matters: processing tiles strictly left-to-right makes
//! clustering artifacts line up visually, so the generator asks for a
//! shuffled order.

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::coord::Coord;

/// Default edge length of a sub-region.
pub const DEFAULT_SUB_REGION_SIZE: u32 = 25;

/// Axis-aligned rectangle `[x, x + width) × [y, y + height)`.
///
/// Edges saturate at the `i32` bounds: cells that would lie past
/// `i32::MAX` are not part of the region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Region {
    /// Creates a new region.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Square region of side `2 * radius + 1` centred on `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn around(x: i32, y: i32, radius: u32) -> Self {
        let side = radius.saturating_mul(2).saturating_add(1);
        Self {
            x: x.saturating_sub_unsigned(radius),
            y: y.saturating_sub_unsigned(radius),
            width: side,
            height: side,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn x_end(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn y_end(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Number of cells covered.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns true if the region covers no cells.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if `(x, y)` lies inside the region.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x_end() && y >= self.y && y < self.y_end()
    }

    /// Integer-floored centre of the region.
    ///
    /// Used to pick the representative cell around which the brush samples.
    #[must_use]
    pub const fn midpoint(&self) -> (i32, i32) {
        if self.is_empty() {
            return (self.x, self.y);
        }
        let last_x = self.x_end() - 1;
        let last_y = self.y_end() - 1;
        (
            (self.x as i64 + last_x as i64).div_euclid(2) as i32,
            (self.y as i64 + last_y as i64).div_euclid(2) as i32,
        )
    }

    /// Iterates every `(x, y)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x0, x1) = (self.x, self.x_end());
        (self.y..self.y_end()).flat_map(move |y| (x0..x1).map(move |x| (x, y)))
    }

    /// Iterates every cell of the region as a coordinate on `level`.
    pub fn coords(&self, level: u32) -> impl Iterator<Item = Coord> {
        self.cells().map(move |(x, y)| Coord::new(level, x, y))
    }

    /// Splits the region into tiles of at most `target × target` cells.
    ///
    /// Tiles are returned row-major and cover the region exactly; edge tiles
    /// are narrower when the size does not divide evenly. A `target` of 0 is
    /// treated as 1.
    #[must_use]
    pub fn subdivide(&self, target: u32) -> Vec<Self> {
        if self.is_empty() {
            return Vec::new();
        }
        let step = target.max(1);
        let cols = self.width.div_ceil(step);
        let rows = self.height.div_ceil(step);

        let mut tiles = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            let ty = row * step;
            let th = step.min(self.height - ty);
            for col in 0..cols {
                let tx = col * step;
                let tw = step.min(self.width - tx);
                tiles.push(Self::new(
                    self.x.saturating_add_unsigned(tx),
                    self.y.saturating_add_unsigned(ty),
                    tw,
                    th,
                ));
            }
        }
        tiles
    }

    /// Same tiles as [`Region::subdivide`], in a random order.
    #[must_use]
    pub fn subdivide_shuffled<R: Rng + ?Sized>(&self, target: u32, rng: &mut R) -> Vec<Self> {
        let mut tiles = self.subdivide(target);
        tiles.shuffle(rng);
        tiles
    }
}

/// A region spanning a contiguous range of levels.
///
/// One `Volume` is the unit of work of a single chunk generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volume {
    /// Horizontal extent.
    pub region: Region,
    /// Levels covered (half-open).
    pub levels: Range<u32>,
}

impl Volume {
    /// Creates a volume over `levels`.
    #[must_use]
    pub const fn new(region: Region, levels: Range<u32>) -> Self {
        Self { region, levels }
    }

    /// Volume covering a single level.
    #[must_use]
    pub const fn single_level(level: u32, region: Region) -> Self {
        Self {
            region,
            levels: level..level + 1,
        }
    }

    /// Number of cells across all levels.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        self.region.area() * u64::from(self.levels.end.saturating_sub(self.levels.start))
    }
}
