//! Backward (upstream) resolution.

use super::cache::CanonicalCache;
use super::edge::{CanonicalEdge, CanonicalSubtree, DependencyEdge};
use super::graph::FieldGraph;
use super::reduce::reduce_canonical;
use crate::core::{FieldId, LineageError, Node};
use std::sync::Arc;
use tracing::debug;

/// Resolves backward closures over one graph with one cache.
///
/// A backward edge `{parent, child, level}` says that `parent` feeds the
/// calculation of `child`, `-level` hops above the resolved root.
pub struct BackwardPass<'g, C> {
    graph: &'g FieldGraph<'g>,
    cache: C,
    /// Fields whose canonical subtree is being built, outermost first
    in_progress: Vec<usize>,
}

impl<'g, C: CanonicalCache> BackwardPass<'g, C> {
    pub fn new(graph: &'g FieldGraph<'g>, cache: C) -> Self {
        Self {
            graph,
            cache,
            in_progress: Vec::new(),
        }
    }

    /// Full backward closure of `root`, levels `<= 0`.
    pub fn resolve(&mut self, root: &FieldId) -> Result<Vec<DependencyEdge>, LineageError> {
        self.resolve_at(root, 0, None)
    }

    /// Backward edges of `field` requested `depth` hops above the root by
    /// `via`.
    ///
    /// The field's canonical subtree is shifted down by `depth`; for
    /// `depth > 0` the edge linking `field` to `via` at level `-depth` is
    /// appended. Unknown fields resolve to nothing.
    pub fn resolve_at(
        &mut self,
        field: &FieldId,
        depth: u32,
        via: Option<&FieldId>,
    ) -> Result<Vec<DependencyEdge>, LineageError> {
        let Some(position) = self.graph.position(field) else {
            debug!("Backward resolution of unknown field {}; no dependencies", field);
            return Ok(Vec::new());
        };

        let subtree = self.canonical(position).inspect_err(|_| self.in_progress.clear())?;
        let depth = i32::try_from(depth).unwrap_or(i32::MAX);

        let mut edges: Vec<DependencyEdge> = subtree
            .iter()
            .map(|edge| DependencyEdge {
                parent: edge.parent.clone(),
                child: edge.child.clone(),
                level: edge.level - depth,
                category: edge.category,
                sheets: None,
            })
            .collect();

        if depth > 0 {
            if let Some(via) = via {
                edges.push(DependencyEdge {
                    parent: field.clone(),
                    child: Node::Field(via.clone()),
                    level: -depth,
                    category: self.graph.category(position),
                    sheets: None,
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
        let field = &self.graph.field(position).id;
        if let Some(subtree) = self.cache.get(field) {
            return Ok(subtree);
        }

        if let Some(start) = self.in_progress.iter().position(|&p| p == position) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(position);
            return Err(LineageError::CyclicDependency {
                chain: self.graph.render_chain(chain),
            });
        }

        self.in_progress.push(position);
        let mut edges = Vec::new();
        for &dependency in self.graph.dependencies(position) {
            edges.push(CanonicalEdge {
                parent: self.graph.field(dependency).id.clone(),
                child: Node::Field(field.clone()),
                level: -1,
                category: self.graph.category(dependency),
                overlap_of: None,
            });
            let upstream = self.canonical(dependency)?;
            edges.extend(upstream.iter().map(|edge| edge.shifted(-1)));
        }
        self.in_progress.pop();

        Ok(self.cache.insert(field.clone(), Arc::from(reduce_canonical(edges))))
    }
}
