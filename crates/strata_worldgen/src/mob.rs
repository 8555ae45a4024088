//! # Mob Simulation
//!
//! Mobs live in the [`SpatialStore`] like everything else; this module owns
//! what they do between frames.
//!
//! ## Movement State Machine
//!
//! A mob only walks the way it faces. Asked to move elsewhere it first turns
//! (one call), and the next call in the same direction steps:
//!
//! ```text
//!   move_mob(dir)
//!        │
//!        ├── mob gone ─────────────────────────> Missing
//!        ├── facing != dir ──> face dir ───────> Turned
//!        └── facing == dir ──> offset one tile back
//!                                  │
//!                                  ├── relocated ─> Stepped(to)
//!                                  └── blocked ───> reset offset, Blocked
//! ```
//!
//! The pixel offset points from the new cell back to the old one, so the
//! renderer can draw the mob where it was and [`PixelOffset::decay`] it
//! towards zero over the next frames.
//!
//! ## Frame Loop
//!
//! 1. [`MobSimulation::tick`] advances every periodic simulator and turns due
//!    random-walk steps into MOVE orders
//! 2. [`MobSimulation::step`] consumes MOVE orders through [`move_mob`] and
//!    reaps DIE / DELETE orders

use std::sync::Arc;

use rand::Rng;
use strata_catalog::MobType;
use strata_core::{Coord, Direction};

use crate::config::GeneratorConfig;
use crate::store::SpatialStore;

// ============================================================================
// IDENTITY & ORDERS
// ============================================================================

/// Store-assigned mob identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MobId(pub u64);

/// Bitmask of pending orders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MobOrders(u8);

impl MobOrders {
    /// Walk one tile in `MobInstance::heading`.
    pub const MOVE: Self = Self(1);
    /// Stop acting; removed on the next step.
    pub const DIE: Self = Self(1 << 1);
    /// Remove from the store.
    pub const DELETE: Self = Self(1 << 2);

    /// No pending orders.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns true if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Returns true if no order is pending.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ============================================================================
// PIXEL OFFSET
// ============================================================================

/// Sub-tile drawing offset of a moving mob, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelOffset {
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset.
    pub y: f32,
}

impl PixelOffset {
    /// No offset.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// One tile back from a step in `direction`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn behind(direction: Direction, tile_size: f32) -> Self {
        let (dx, dy) = direction.opposite().delta();
        Self {
            x: dx as f32 * tile_size,
            y: dy as f32 * tile_size,
        }
    }

    /// Moves the offset `fraction` of the way towards zero, snapping to zero
    /// once it is under half a pixel.
    pub fn decay(&mut self, fraction: f32) {
        let keep = 1.0 - fraction.clamp(0.0, 1.0);
        self.x *= keep;
        self.y *= keep;
        if self.x.abs() < 0.5 {
            self.x = 0.0;
        }
        if self.y.abs() < 0.5 {
            self.y = 0.0;
        }
    }

    /// Returns true if the mob is drawn exactly on its cell.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

// ============================================================================
// PERIODIC SIMULATORS
// ============================================================================

/// What a periodic simulator does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Pick a random orthogonal direction and walk one tile if the
    /// destination is passable.
    RandomWalk,
}

/// A behaviour that fires every `interval_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicSimulator {
    /// Firing interval (ms).
    pub interval_ms: u32,
    /// Time since the last firing (ms).
    pub elapsed_ms: u32,
    /// Action on firing.
    pub behavior: Behavior,
}

impl PeriodicSimulator {
    /// Creates a simulator that first fires after `interval_ms`.
    #[must_use]
    pub const fn new(behavior: Behavior, interval_ms: u32) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0,
            behavior,
        }
    }

    /// Random walk with an interval drawn from the configured range.
    pub fn random_walk<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Self {
        let max = config.mob_step_max_ms.max(config.mob_step_min_ms);
        Self::new(Behavior::RandomWalk, rng.gen_range(config.mob_step_min_ms..=max))
    }

    /// Advances by `dt_ms`; returns how many times the simulator fired.
    pub fn advance(&mut self, dt_ms: u32) -> u32 {
        let interval = self.interval_ms.max(1);
        let total = self.elapsed_ms.saturating_add(dt_ms);
        self.elapsed_ms = total % interval;
        total / interval
    }
}

// ============================================================================
// MOB INSTANCE
// ============================================================================

/// A mob placed in the world.
#[derive(Clone, Debug)]
pub struct MobInstance {
    /// Assigned by the store on append.
    pub id: MobId,
    /// Current cell.
    pub coord: Coord,
    /// Facing.
    pub direction: Direction,
    /// Direction of the pending MOVE order.
    pub heading: Direction,
    /// Pending orders.
    pub orders: MobOrders,
    /// Drawing offset while moving.
    pub offset: PixelOffset,
    /// Attached behaviours.
    pub simulators: Vec<PeriodicSimulator>,
    /// Mob type.
    pub mob_type: Arc<MobType>,
}

impl MobInstance {
    /// Creates an idle mob facing down.
    #[must_use]
    pub fn new(coord: Coord, mob_type: Arc<MobType>) -> Self {
        Self {
            id: MobId::default(),
            coord,
            direction: Direction::Down,
            heading: Direction::Down,
            orders: MobOrders::empty(),
            offset: PixelOffset::ZERO,
            simulators: Vec::new(),
            mob_type,
        }
    }

    /// Creates a mob as the population pass does: animated mobs wander.
    pub fn spawn<R: Rng + ?Sized>(
        coord: Coord,
        mob_type: Arc<MobType>,
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Self {
        let mut mob = Self::new(coord, mob_type);
        if mob.mob_type.animation.is_animated() {
            mob.simulators.push(PeriodicSimulator::random_walk(config, rng));
        }
        mob
    }
}

// ============================================================================
// MOVEMENT
// ============================================================================

/// Result of one [`move_mob`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The mob turned to face the direction and did not move.
    Turned,
    /// The mob moved to the contained cell.
    Stepped(Coord),
    /// The destination was not passable.
    Blocked,
    /// No such mob.
    Missing,
}

/// Turns or steps mob `id` towards `direction`.
pub fn move_mob(store: &SpatialStore, id: MobId, direction: Direction, tile_size: f32) -> MoveOutcome {
    let Some(mob) = store.mob(id) else {
        return MoveOutcome::Missing;
    };

    if mob.direction != direction {
        store.update_mob(id, |m| m.direction = direction);
        return MoveOutcome::Turned;
    }

    let from = mob.coord;
    let to = from.step(direction);
    store.update_mob(id, |m| m.offset = PixelOffset::behind(direction, tile_size));

    if store.relocate_mob(id, from, to) == to {
        MoveOutcome::Stepped(to)
    } else {
        store.update_mob(id, |m| m.offset = PixelOffset::ZERO);
        MoveOutcome::Blocked
    }
}

/// Outcome counts of one [`MobSimulation::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Mobs that turned.
    pub turned: usize,
    /// Mobs that moved.
    pub stepped: usize,
    /// Mobs whose move was blocked.
    pub blocked: usize,
    /// Mobs removed from the store.
    pub reaped: usize,
}

/// Drives every mob's behaviour from the caller's frame loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobSimulation {
    tile_size: f32,
}

impl MobSimulation {
    /// Creates a simulation moving mobs on a grid of `tile_size` pixels.
    #[must_use]
    pub const fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    /// Tile size used for movement offsets.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Advances every simulator by `dt_ms` and issues MOVE orders for due
    /// random-walk steps whose destination is passable.
    ///
    /// Returns the number of orders issued.
    pub fn tick<R: Rng + ?Sized>(&self, store: &SpatialStore, dt_ms: u32, rng: &mut R) -> usize {
        let mut issued = 0;
        for id in store.mob_ids() {
            let Some((coord, walks)) = store.update_mob(id, |mob| {
                if mob.orders.contains(MobOrders::DIE) || mob.orders.contains(MobOrders::DELETE) {
                    return (mob.coord, 0);
                }
                let walks = mob
                    .simulators
                    .iter_mut()
                    .filter(|s| s.behavior == Behavior::RandomWalk)
                    .map(|s| s.advance(dt_ms))
                    .sum::<u32>();
                (mob.coord, walks)
            }) else {
                continue;
            };

            // Only the last due step matters: orders do not queue.
            if walks == 0 {
                continue;
            }
            let direction = random_direction(rng);
            if !store.is_passable(coord.step(direction)) {
                continue;
            }
            store.update_mob(id, |mob| {
                mob.heading = direction;
                mob.orders.insert(MobOrders::MOVE);
            });
            issued += 1;
        }
        issued
    }

    /// Consumes pending orders of every mob.
    ///
    /// A MOVE order that only turned the mob stays pending, so the mob steps
    /// on the following call. DIE marks the mob for deletion; DELETE removes
    /// it.
    pub fn step(&self, store: &SpatialStore) -> StepReport {
        let mut report = StepReport::default();
        for id in store.mob_ids() {
            let Some(mob) = store.mob(id) else { continue };

            if mob.orders.contains(MobOrders::DELETE) {
                if store.remove_mob(id).is_some() {
                    report.reaped += 1;
                }
                continue;
            }
            if mob.orders.contains(MobOrders::DIE) {
                store.update_mob(id, |m| {
                    m.orders = MobOrders::DELETE;
                });
                continue;
            }
            if !mob.orders.contains(MobOrders::MOVE) {
                continue;
            }

            match move_mob(store, id, mob.heading, self.tile_size) {
                MoveOutcome::Turned => report.turned += 1,
                outcome => {
                    store.update_mob(id, |m| m.orders.remove(MobOrders::MOVE));
                    match outcome {
                        MoveOutcome::Stepped(_) => report.stepped += 1,
                        MoveOutcome::Blocked => report.blocked += 1,
                        MoveOutcome::Turned | MoveOutcome::Missing => {}
                    }
                }
            }
        }
        report
    }

    /// Orders mob `id` to die. Returns false if it does not exist.
    pub fn kill(&self, store: &SpatialStore, id: MobId) -> bool {
        store.update_mob(id, |m| m.orders.insert(MobOrders::DIE)).is_some()
    }

    /// Decays every mob's pixel offset by `fraction`.
    pub fn settle(&self, store: &SpatialStore, fraction: f32) {
        for id in store.mob_ids() {
            store.update_mob(id, |m| m.offset.decay(fraction));
        }
    }
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strata_catalog::{AnimationTable, BiomeType, TerrainType, TypeCatalog};
    use strata_core::Region;

    fn open_field(width: u32) -> (SpatialStore, Arc<MobType>) {
        let catalog = Arc::new(
            TypeCatalog::builder(1)
                .biome(BiomeType::new("meadow", 0, 0).with_terrain("grass", 1))
                .terrain(TerrainType::new("grass"))
                .terrain(TerrainType::new("water").impassable(true))
                .mob(MobType::new("rabbit").with_animation(AnimationTable::uniform(&["r0", "r1"], 100)))
                .build()
                .unwrap(),
        );
        let store = SpatialStore::new(Arc::clone(&catalog));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let maps = catalog.type_maps();
        for (x, y) in Region::new(0, 0, width, width).cells() {
            store
                .write_terrain(Coord::new(0, x, y), &maps.biomes["meadow"], &maps.terrains["grass"], &mut rng)
                .unwrap();
        }
        (store, Arc::clone(&maps.mobs["rabbit"]))
    }

    #[test]
    fn test_turn_then_step() {
        let (store, rabbit) = open_field(5);
        let id = store.append_mob(MobInstance::new(Coord::new(0, 2, 2), rabbit));

        assert_eq!(move_mob(&store, id, Direction::Left, 32.0), MoveOutcome::Turned);
        let mob = store.mob(id).unwrap();
        assert_eq!(mob.coord, Coord::new(0, 2, 2));
        assert_eq!(mob.direction, Direction::Left);
        assert!(mob.offset.is_zero());

        assert_eq!(
            move_mob(&store, id, Direction::Left, 32.0),
            MoveOutcome::Stepped(Coord::new(0, 1, 2))
        );
        let mob = store.mob(id).unwrap();
        assert_eq!(mob.coord, Coord::new(0, 1, 2));
        assert!((mob.offset.x - 32.0).abs() < f32::EPSILON);
        assert!(mob.offset.y.abs() < f32::EPSILON);
    }

    #[test]
    fn test_blocked_step_resets_offset() {
        let (store, rabbit) = open_field(3);
        let id = store.append_mob(MobInstance::new(Coord::new(0, 1, 2), rabbit));

        assert_eq!(move_mob(&store, id, Direction::Down, 32.0), MoveOutcome::Blocked);
        let mob = store.mob(id).unwrap();
        assert_eq!(mob.coord, Coord::new(0, 1, 2));
        assert!(mob.offset.is_zero());

        assert_eq!(move_mob(&store, MobId(999), Direction::Down, 32.0), MoveOutcome::Missing);
    }

    #[test]
    fn test_offset_decay() {
        let mut offset = PixelOffset::behind(Direction::Up, 32.0);
        assert!((offset.y - 32.0).abs() < f32::EPSILON);
        offset.decay(0.5);
        assert!((offset.y - 16.0).abs() < f32::EPSILON);
        for _ in 0..10 {
            offset.decay(0.5);
        }
        assert!(offset.is_zero());
    }

    #[test]
    fn test_simulator_fires_on_interval() {
        let mut sim = PeriodicSimulator::new(Behavior::RandomWalk, 3000);
        assert_eq!(sim.advance(2999), 0);
        assert_eq!(sim.advance(1), 1);
        assert_eq!(sim.advance(6500), 2);
        assert_eq!(sim.elapsed_ms, 500);

        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            let walk = PeriodicSimulator::random_walk(&config, &mut rng);
            assert!((3000..=4000).contains(&walk.interval_ms));
        }
    }

    #[test]
    fn test_tick_and_step_walk_mobs() {
        let (store, rabbit) = open_field(9);
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let id = store.append_mob(MobInstance::spawn(Coord::new(0, 4, 4), rabbit, &config, &mut rng));
        assert_eq!(store.mob(id).unwrap().simulators.len(), 1);

        let sim = MobSimulation::new(config.tile_size);
        assert_eq!(sim.tick(&store, 100, &mut rng), 0);

        let mut moved = 0;
        for _ in 0..20 {
            sim.tick(&store, 4000, &mut rng);
            let report = sim.step(&store);
            moved += report.stepped;
            let report = sim.step(&store);
            moved += report.stepped;
        }
        let mob = store.mob(id).unwrap();
        println!("rabbit moved {moved} times, now at {:?}", mob.coord);
        assert!(moved > 0);
        assert!(Region::new(0, 0, 9, 9).contains(mob.coord.x, mob.coord.y));
    }

    #[test]
    fn test_die_then_delete() {
        let (store, rabbit) = open_field(3);
        let id = store.append_mob(MobInstance::new(Coord::new(0, 1, 1), rabbit));
        let sim = MobSimulation::new(32.0);

        assert!(sim.kill(&store, id));
        assert_eq!(sim.step(&store).reaped, 0);
        assert!(store.mob(id).unwrap().orders.contains(MobOrders::DELETE));
        assert_eq!(sim.step(&store).reaped, 1);
        assert!(store.mob(id).is_none());
        assert!(!sim.kill(&store, id));
    }

    #[test]
    fn test_orders_bitmask() {
        let mut orders = MobOrders::empty();
        assert!(orders.is_empty());
        orders.insert(MobOrders::MOVE);
        orders.insert(MobOrders::DIE);
        assert!(orders.contains(MobOrders::MOVE) && orders.contains(MobOrders::DIE));
        orders.remove(MobOrders::MOVE);
        assert!(!orders.contains(MobOrders::MOVE));
        assert!(!orders.contains(MobOrders::DELETE));
    }
}
