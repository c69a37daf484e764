//! Duplicate-edge reduction and level queries.
//!
//! The same ancestor or descendant is often reachable along several chains
//! at different depths. Only the closest occurrence matters for reporting, so
//! each closure is reduced to one edge per key before aggregation.

use super::edge::{CanonicalEdge, DependencyEdge};
use crate::core::{Category, FieldId, Node};
use std::collections::BTreeMap;

/// Keep one item per key: the one whose level is closest to zero, the first
/// one on ties. Output is ordered by key.
pub fn reduce_unique<T, K, FK, FL>(
    items: impl IntoIterator<Item = T>,
    key: FK,
    level: FL,
) -> Vec<T>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FL: Fn(&T) -> i32,
{
    let mut best: BTreeMap<K, T> = BTreeMap::new();
    for item in items {
        let k = key(&item);
        match best.get(&k) {
            Some(kept) if level(kept).unsigned_abs() <= level(&item).unsigned_abs() => {}
            _ => {
                best.insert(k, item);
            }
        }
    }
    best.into_values().collect()
}

/// Backward key: (child, parent, category).
pub type BackwardKey = (Node, FieldId, Category);

/// Forward key: (child, parent, category, sheets).
pub type ForwardKey = (Node, FieldId, Category, Option<u32>);

/// Reduce a backward closure to one edge per (child, parent, category).
#[must_use]
pub fn reduce_backward(edges: Vec<DependencyEdge>) -> Vec<DependencyEdge> {
    reduce_unique(
        edges,
        |e: &DependencyEdge| -> BackwardKey { (e.child.clone(), e.parent.clone(), e.category) },
        |e: &DependencyEdge| e.level,
    )
}

/// Reduce a forward closure to one edge per (child, parent, category, sheets).
#[must_use]
pub fn reduce_forward(edges: Vec<DependencyEdge>) -> Vec<DependencyEdge> {
    reduce_unique(
        edges,
        |e: &DependencyEdge| -> ForwardKey {
            (e.child.clone(), e.parent.clone(), e.category, e.sheets)
        },
        |e: &DependencyEdge| e.level,
    )
}

/// Reduce a canonical subtree before it is frozen.
///
/// `overlap_of` follows from the edge's endpoints, so this key collapses
/// exactly the edges the backward and forward reductions would collapse
/// later. Without it a subtree keeps one edge per path.
#[must_use]
pub fn reduce_canonical(edges: Vec<CanonicalEdge>) -> Vec<CanonicalEdge> {
    reduce_unique(
        edges,
        |e: &CanonicalEdge| {
            (e.child.clone(), e.parent.clone(), e.category, e.overlap_of.clone())
        },
        |e: &CanonicalEdge| e.level,
    )
}

/// The most extreme level present, compared as signed integers: most
/// negative for backward closures, most positive for forward ones, 0 when
/// empty.
#[must_use]
pub fn max_level(edges: &[DependencyEdge]) -> i32 {
    edges.iter().map(|e| e.level).max_by_key(|level| level.unsigned_abs()).unwrap_or(0)
}
