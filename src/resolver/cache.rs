//! Canonical subtree caches.
//!
//! A canonical subtree is the edge list of a field computed as though that
//! field were the resolution root. It is frozen the first time the field is
//! resolved and adapted arithmetically on every later request, which keeps
//! resolution linear in practice when many fields share deep chains.
//!
//! Each pass owns its cache; backward and forward entries never mix. Two
//! implementations exist:
//!
//! - [`LocalCache`]: a plain map owned by one pass on one thread
//! - [`SharedCache`]: a [`DashMap`] shared by reference between worker threads
//!
//! Both follow the same contract: an entry is written once, the first writer
//! wins, and a later writer receives the stored value. Entries for a given
//! field are equal no matter which thread computes them, so a lost race
//! changes nothing observable.

use super::edge::CanonicalSubtree;
use crate::core::FieldId;
use dashmap::DashMap;
use std::collections::HashMap;

/// Storage for canonical subtrees.
pub trait CanonicalCache {
    /// Canonical subtree of `field`, if already frozen.
    fn get(&self, field: &FieldId) -> Option<CanonicalSubtree>;

    /// Freeze a subtree unless one is already stored; returns the stored one.
    fn insert(&mut self, field: FieldId, subtree: CanonicalSubtree) -> CanonicalSubtree;

    /// Number of frozen subtrees.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-threaded cache.
#[derive(Debug, Default)]
pub struct LocalCache {
    entries: HashMap<FieldId, CanonicalSubtree>,
}

impl LocalCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CanonicalCache for LocalCache {
    fn get(&self, field: &FieldId) -> Option<CanonicalSubtree> {
        self.entries.get(field).cloned()
    }

    fn insert(&mut self, field: FieldId, subtree: CanonicalSubtree) -> CanonicalSubtree {
        self.entries.entry(field).or_insert(subtree).clone()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cache shared between worker threads.
///
/// Passes take it by reference (`&SharedCache` implements [`CanonicalCache`]).
#[derive(Debug, Default)]
pub struct SharedCache {
    entries: DashMap<FieldId, CanonicalSubtree>,
}

impl SharedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CanonicalCache for &SharedCache {
    fn get(&self, field: &FieldId) -> Option<CanonicalSubtree> {
        self.entries.get(field).map(|entry| entry.value().clone())
    }

    fn insert(&mut self, field: FieldId, subtree: CanonicalSubtree) -> CanonicalSubtree {
        self.entries.entry(field).or_insert(subtree).value().clone()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
