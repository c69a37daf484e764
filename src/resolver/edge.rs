//! Dependency edges as emitted by the passes and as stored in the cache.

use crate::core::{Category, FieldId, Node};
use serde::Serialize;
use std::sync::Arc;

/// One edge of a backward or forward closure.
///
/// Backward edges point from an ancestor (`parent`) to the field consuming it
/// (`child`) and carry levels `<= 0`. Forward edges point from a field to its
/// consumer, field or worksheet, and carry levels `>= 0`. `sheets` is the
/// number of worksheets the edge's field shares with the resolved root; it is
/// only set on forward edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyEdge {
    pub parent: FieldId,
    pub child: Node,
    pub level: i32,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets: Option<u32>,
}

/// An edge of a canonical subtree: levels relative to the subtree's own
/// field, worksheet overlap left open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEdge {
    pub parent: FieldId,
    pub child: Node,
    pub level: i32,
    pub category: Category,
    /// Field whose worksheets define the overlap once a root is known
    pub overlap_of: Option<FieldId>,
}

impl CanonicalEdge {
    /// Copy of this edge moved `delta` levels.
    #[must_use]
    pub fn shifted(&self, delta: i32) -> Self {
        Self {
            level: self.level + delta,
            ..self.clone()
        }
    }
}

/// Frozen edge list of one field, shared between cache and readers.
pub type CanonicalSubtree = Arc<[CanonicalEdge]>;
