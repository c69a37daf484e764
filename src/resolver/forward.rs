//! Forward (downstream) resolution.

use super::cache::CanonicalCache;
use super::edge::{CanonicalEdge, CanonicalSubtree, DependencyEdge};
use super::graph::FieldGraph;
use super::reduce::reduce_canonical;
use crate::core::{Category, FieldId, LineageError, Node, SheetId};
use std::sync::Arc;
use tracing::debug;

/// Resolves forward closures over one graph with one cache.
///
/// Forward edges run from a field to each field whose calculation uses it
/// and, as terminal edges, to each worksheet using it directly. A worksheet
/// edge sits at the level of the field it hangs off: the root's own
/// worksheets are at level 0.
pub struct ForwardPass<'g, C> {
    graph: &'g FieldGraph<'g>,
    cache: C,
    in_progress: Vec<usize>,
}

impl<'g, C: CanonicalCache> ForwardPass<'g, C> {
    pub fn new(graph: &'g FieldGraph<'g>, cache: C) -> Self {
        Self {
            graph,
            cache,
            in_progress: Vec::new(),
        }
    }

    /// Full forward closure of `root`, levels `>= 0`, with worksheet overlap
    /// counted against the root's own worksheets.
    pub fn resolve(&mut self, root: &FieldId) -> Result<Vec<DependencyEdge>, LineageError> {
        let Some(position) = self.graph.position(root) else {
            debug!("Forward resolution of unknown field {}; no dependencies", root);
            return Ok(Vec::new());
        };
        let root_worksheets = self.graph.field(position).worksheets.clone();
        self.resolve_at(root, &root_worksheets, 0, None)
    }

    /// Forward edges of `field` requested `depth` hops below the root by
    /// `via`, with overlap counted against `root_worksheets`.
    ///
    /// For `depth > 0` the edge linking `via` to `field` at level `depth` is
    /// appended.
    pub fn resolve_at(
        &mut self,
        field: &FieldId,
        root_worksheets: &[SheetId],
        depth: u32,
        via: Option<&FieldId>,
    ) -> Result<Vec<DependencyEdge>, LineageError> {
        let Some(position) = self.graph.position(field) else {
            debug!("Forward resolution of unknown field {}; no dependencies", field);
            return Ok(Vec::new());
        };

        let subtree = self.canonical(position).inspect_err(|_| self.in_progress.clear())?;
        let depth = i32::try_from(depth).unwrap_or(i32::MAX);

        let mut edges: Vec<DependencyEdge> = subtree
            .iter()
            .map(|edge| DependencyEdge {
                parent: edge.parent.clone(),
                child: edge.child.clone(),
                level: edge.level + depth,
                category: edge.category,
                sheets: edge
                    .overlap_of
                    .as_ref()
                    .map(|owner| self.graph.overlap(owner, root_worksheets)),
            })
            .collect();

        if depth > 0 {
            if let Some(via) = via {
                edges.push(DependencyEdge {
                    parent: via.clone(),
                    child: Node::Field(field.clone()),
                    level: depth,
                    category: self.graph.category(position),
                    sheets: Some(self.graph.overlap(field, root_worksheets)),
                });
            }
        }

        Ok(edges)
    }

    /// Number of canonical subtrees frozen so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn canonical(&mut self, position: usize) -> Result<CanonicalSubtree, LineageError> {
        let field = self.graph.field(position);
        if let Some(subtree) = self.cache.get(&field.id) {
            return Ok(subtree);
        }

        if let Some(start) = self.in_progress.iter().position(|&p| p == position) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(position);
            chain.reverse();
            return Err(LineageError::CyclicDependency {
                chain: self.graph.render_chain(chain),
            });
        }

        self.in_progress.push(position);
        let mut edges: Vec<CanonicalEdge> = field
            .worksheets
            .iter()
            .map(|sheet| CanonicalEdge {
                parent: field.id.clone(),
                child: Node::Sheet(sheet.clone()),
                level: 0,
                category: Category::Sheet,
                overlap_of: Some(field.id.clone()),
            })
            .collect();

        for &consumer in self.graph.consumers(position) {
            let consumer_id = &self.graph.field(consumer).id;
            edges.push(CanonicalEdge {
                parent: field.id.clone(),
                child: Node::Field(consumer_id.clone()),
                level: 1,
                category: self.graph.category(consumer),
                overlap_of: Some(consumer_id.clone()),
            });
            let downstream = self.canonical(consumer)?;
            edges.extend(downstream.iter().map(|edge| edge.shifted(1)));
        }
        self.in_progress.pop();

        Ok(self.cache.insert(field.id.clone(), Arc::from(reduce_canonical(edges))))
    }
}
