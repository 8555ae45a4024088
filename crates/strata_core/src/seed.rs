//! # World Seeds
//!
//! Generation runs many tasks concurrently. Sharing one random generator
//! between them would either serialize the tasks or make every draw depend on
//! scheduling, so each task gets its own stream derived from the root seed
//! and the task's identity (run, level, pass, sub-region).

/// Root seed for a generator instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose.
    ///
    /// Chaining derivations (`seed.derive(run).derive(level)`) yields
    /// independent streams for every task.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // splitmix64 finalizer over the xor-mixed input
        let mut z = (self.0 ^ purpose.rotate_left(29)).wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self(z ^ (z >> 31))
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

impl From<u64> for WorldSeed {
    fn from(seed: u64) -> Self {
        Self(seed)
    }
}
