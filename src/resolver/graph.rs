//! Field dependency graph.
//!
//! Wraps a petgraph [`DiGraph`] with one node per catalog field and an edge
//! from every field to each field its calculation references. The passes walk
//! the adjacency lists precomputed here in catalog order; petgraph backs the
//! cycle check and the graph exports.

use crate::catalog::{Catalog, Field};
use crate::core::{Category, FieldId, LineageError, SheetId};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Colors for DFS-based cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited
    White,
    /// On the current DFS path
    Gray,
    /// Finished
    Black,
}

/// Dependency graph over one catalog.
pub struct FieldGraph<'c> {
    catalog: &'c Catalog,
    graph: DiGraph<FieldId, ()>,
    node_map: HashMap<FieldId, NodeIndex>,
    /// Positions of the fields each field references
    dependencies: Vec<Vec<usize>>,
    /// Positions of the fields referencing each field
    consumers: Vec<Vec<usize>>,
}

impl<'c> FieldGraph<'c> {
    /// Build the graph. References to ids missing from the catalog are
    /// dropped with a debug log.
    #[must_use]
    pub fn new(catalog: &'c Catalog) -> Self {
        let mut graph = DiGraph::with_capacity(catalog.len(), 0);
        let mut node_map = HashMap::with_capacity(catalog.len());
        for field in catalog.fields() {
            let index = graph.add_node(field.id.clone());
            node_map.insert(field.id.clone(), index);
        }

        let mut dependencies = vec![Vec::new(); catalog.len()];
        let mut consumers = vec![Vec::new(); catalog.len()];
        for (position, field) in catalog.fields().iter().enumerate() {
            for dependency in &field.dependencies {
                let Some(target) = catalog.position(dependency) else {
                    debug!("{} references unknown field {}; ignored", field.id, dependency);
                    continue;
                };
                if dependencies[position].contains(&target) {
                    continue;
                }
                dependencies[position].push(target);
                consumers[target].push(position);
                graph.add_edge(NodeIndex::new(position), NodeIndex::new(target), ());
            }
        }
        for list in &mut consumers {
            list.sort_unstable();
        }

        Self {
            catalog,
            graph,
            node_map,
            dependencies,
            consumers,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Field at a catalog position.
    #[must_use]
    pub fn field(&self, position: usize) -> &'c Field {
        &self.catalog.fields()[position]
    }

    #[must_use]
    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.node_map.get(id).map(|index| index.index())
    }

    #[must_use]
    pub fn category(&self, position: usize) -> Category {
        self.field(position).category
    }

    /// Direct dependencies of a field, in catalog order.
    #[must_use]
    pub fn dependencies(&self, position: usize) -> &[usize] {
        &self.dependencies[position]
    }

    /// Fields whose calculation references the field, in catalog order.
    #[must_use]
    pub fn consumers(&self, position: usize) -> &[usize] {
        &self.consumers[position]
    }

    /// Number of the field's worksheets that are also in `root_worksheets`.
    #[must_use]
    pub fn overlap(&self, field: &FieldId, root_worksheets: &[SheetId]) -> u32 {
        let Some(position) = self.position(field) else {
            return 0;
        };
        let count = self
            .field(position)
            .worksheets
            .iter()
            .filter(|sheet| root_worksheets.contains(sheet))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Detect cycles using DFS with colors.
    ///
    /// Fails with the first cycle found, rendered with qualified labels.
    pub fn detect_cycles(&self) -> Result<(), LineageError> {
        let mut colors = vec![Color::White; self.graph.node_count()];
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if colors[node.index()] != Color::White {
                continue;
            }
            if let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path) {
                return Err(LineageError::CyclicDependency {
                    chain: self.render_chain(cycle.iter().map(|index| index.index())),
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut [Color],
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors[node.index()] = Color::Gray;
        path.push(node);

        for &next in self.dependencies(node.index()) {
            let neighbor = NodeIndex::new(next);
            match colors[next] {
                Color::Gray => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors[node.index()] = Color::Black;
        None
    }

    /// Render positions as `a → b → a` using qualified labels.
    #[must_use]
    pub fn render_chain<I>(&self, positions: I) -> String
    where
        I: IntoIterator<Item = usize>,
    {
        positions
            .into_iter()
            .map(|p| self.field(p).qualified_label.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }

    /// Every field reachable through dependencies, found breadth-first.
    #[must_use]
    pub fn upstream(&self, position: usize) -> BTreeSet<usize> {
        self.reachable(position, |p| self.dependencies(p))
    }

    /// Every field reachable through consumers, found breadth-first.
    #[must_use]
    pub fn downstream(&self, position: usize) -> BTreeSet<usize> {
        self.reachable(position, |p| self.consumers(p))
    }

    fn reachable<'a, F>(&'a self, position: usize, next: F) -> BTreeSet<usize>
    where
        F: Fn(usize) -> &'a [usize],
    {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([position]);
        while let Some(current) = queue.pop_front() {
            for &neighbor in next(current) {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        seen
    }
}
