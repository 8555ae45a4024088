//! # Weighted Name Tables
//!
//! Every "pick one of these" decision in generation (terrain for a biome,
//! object for a terrain, biome for a level) draws from a `WeightedTable`.
//! Entries with weight 0 stay listed (they still count as compatible) but are
//! never drawn.

use std::sync::Arc;

use rand::Rng;

/// A single entry in a weighted table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedEntry {
    /// Referenced definition name.
    pub name: Arc<str>,
    /// Relative draw weight.
    pub weight: u32,
}

/// A list of names with relative weights.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightedTable {
    entries: Vec<WeightedEntry>,
    /// Sum of all weights (pre-calculated).
    total_weight: u64,
}

impl WeightedTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            total_weight: 0,
        }
    }

    /// Builds a table from `(name, weight)` pairs.
    pub fn from_entries<N, I>(entries: I) -> Self
    where
        N: Into<Arc<str>>,
        I: IntoIterator<Item = (N, u32)>,
    {
        let mut table = Self::new();
        for (name, weight) in entries {
            table.push(name, weight);
        }
        table
    }

    /// Appends an entry.
    pub fn push(&mut self, name: impl Into<Arc<str>>, weight: u32) {
        self.total_weight += u64::from(weight);
        self.entries.push(WeightedEntry {
            name: name.into(),
            weight,
        });
    }

    /// Number of listed entries (including zero-weight ones).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing can be drawn from the table.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Sum of all weights.
    #[inline]
    #[must_use]
    pub const fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[WeightedEntry] {
        &self.entries
    }

    /// Iterates entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.entries.iter().map(|e| &e.name)
    }

    /// Returns true if `name` is listed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| &*e.name == name)
    }

    /// Draws one name with probability proportional to its weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Arc<str>> {
        if self.total_weight == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..self.total_weight);
        for entry in &self.entries {
            let w = u64::from(entry.weight);
            if roll < w {
                return Some(&entry.name);
            }
            roll -= w;
        }
        None
    }

    /// Draws among the entries accepted by `filter`, re-weighted over that
    /// subset only.
    pub fn pick_where<R, F>(&self, rng: &mut R, mut filter: F) -> Option<&Arc<str>>
    where
        R: Rng + ?Sized,
        F: FnMut(&str) -> bool,
    {
        let eligible: Vec<&WeightedEntry> = self
            .entries
            .iter()
            .filter(|e| e.weight > 0 && filter(&e.name))
            .collect();
        let total: u64 = eligible.iter().map(|e| u64::from(e.weight)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..total);
        for entry in eligible {
            let w = u64::from(entry.weight);
            if roll < w {
                return Some(&entry.name);
            }
            roll -= w;
        }
        None
    }
}
