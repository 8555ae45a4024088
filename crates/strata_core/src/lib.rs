//! # STRATA Core
//!
//! Grid vocabulary shared by every STRATA crate.
//!
//! ## Core Components
//!
//! - `Coord`: a cell address `(level, x, y)` in the level-indexed grid
//! - `Direction`: one of the four orthogonal facings
//! - `Region`: an axis-aligned rectangle that partitions into sub-regions
//! - `Volume`: a region spanning a range of levels (one generation request)
//! - `WorldSeed`: root seed with per-purpose derivation
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{Coord, Direction, Region};
//!
//! let chunk = Region::new(0, 0, 100, 100);
//! let tiles = chunk.subdivide(25);
//! assert_eq!(tiles.len(), 16);
//!
//! let origin = Coord::new(0, 10, 10);
//! assert_eq!(origin.step(Direction::Left), Coord::new(0, 9, 10));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod coord;
pub mod region;
pub mod seed;

pub use coord::{Coord, Direction};
pub use region::{Region, Volume};
pub use seed::WorldSeed;
