//! Graphviz DOT documents of field and sheet dependencies.
//!
//! A field graph shows one field (highlighted) with every field→field edge
//! of its backward and forward closures; worksheet edges are left out. A
//! sheet graph shows the fields a worksheet uses directly, the direct edges
//! among them, and links only the fields that feed none of the others to the
//! sheet node.
//!
//! Documents are emitted with [`petgraph::dot::Dot`]; rendering them to
//! images is left to Graphviz.

use crate::catalog::{Catalog, Field};
use crate::constants::{GRAPHS_DIR, SHEETS_GRAPH_DIR};
use crate::core::{Category, FieldId, LineageError, Node, SheetId};
use crate::resolver::FieldLineage;
use crate::utils::{
    CancellationFlag, ProgressBar, atomic_write, check_path_length, sanitize_file_stem,
};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A node of a rendered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotNode {
    pub label: String,
    pub category: Category,
    pub highlighted: bool,
}

impl fmt::Display for DotNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_attributes(node: &DotNode) -> String {
    let (shape, color) = match node.category {
        Category::Parameter => ("parallelogram", "#cbc3e3"),
        Category::Field => ("box", "green"),
        Category::CalculatedField => ("oval", "orange"),
        Category::CalculatedFieldLod => ("oval", "red"),
        Category::Sheet => ("note", "lightgrey"),
    };
    let fill = if node.highlighted { "lightblue" } else { color };
    format!(
        "label=\"{}\" shape={} style=filled fillcolor=\"{}\" tooltip=\"{}\"",
        escape(&node.label),
        shape,
        fill,
        node.category
    )
}

/// A small directed graph with labelled, styled nodes.
#[derive(Debug, Default)]
pub struct DotGraph {
    graph: DiGraph<DotNode, &'static str>,
    index: HashMap<String, NodeIndex>,
    edges: BTreeSet<(NodeIndex, NodeIndex)>,
}

impl DotGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node once per key; later calls return the existing node.
    pub fn node(&mut self, key: &str, node: DotNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(key.to_string(), idx);
        idx
    }

    /// Add an edge once.
    pub fn edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.edges.insert((from, to)) {
            self.graph.add_edge(from, to, "");
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render as a DOT `digraph`.
    pub fn render(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (_, node)| node_attributes(node),
        );
        format!("{dot}")
    }
}

fn field_node(field: &Field, short: bool, highlighted: bool) -> DotNode {
    DotNode {
        label: if short { field.field_label.clone() } else { field.qualified_label.clone() },
        category: field.category,
        highlighted,
    }
}

/// DOT document for one field, or `None` when it has no field→field edge.
pub fn field_graph(catalog: &Catalog, lineage: &FieldLineage) -> Option<String> {
    let root = catalog.get(&lineage.field)?;
    let edges: Vec<(&FieldId, &FieldId)> = lineage
        .backward
        .iter()
        .chain(&lineage.forward)
        .filter_map(|e| match &e.child {
            Node::Field(child) => Some((&e.parent, child)),
            Node::Sheet(_) => None,
        })
        .collect();
    if edges.is_empty() {
        return None;
    }

    // Fields of the root's own source and parameters drop the source prefix
    let short = |f: &Field| f.source_name == root.source_name || f.category == Category::Parameter;

    let mut graph = DotGraph::new();
    graph.node(root.id.as_str(), field_node(root, true, true));
    for (parent, child) in edges {
        let (Some(parent), Some(child)) = (catalog.get(parent), catalog.get(child)) else {
            continue;
        };
        let from = graph.node(parent.id.as_str(), field_node(parent, short(parent), false));
        let to = graph.node(child.id.as_str(), field_node(child, short(child), false));
        graph.edge(from, to);
    }
    Some(graph.render())
}

/// DOT document for one worksheet.
pub fn sheet_graph(catalog: &Catalog, sheet: &SheetId) -> String {
    let label = catalog.sheets().label_of(sheet).unwrap_or(sheet.as_str());
    let users: Vec<&Field> =
        catalog.fields().iter().filter(|f| f.worksheets.contains(sheet)).collect();
    let user_ids: BTreeSet<&FieldId> = users.iter().map(|f| &f.id).collect();

    let mut internal: Vec<(&Field, &Field)> = Vec::new();
    for &child in &users {
        for dep in child.dependencies.iter().filter(|dep| user_ids.contains(dep)) {
            if let Some(parent) = catalog.get(dep) {
                internal.push((parent, child));
            }
        }
    }
    let parents: BTreeSet<&FieldId> = internal.iter().map(|(parent, _)| &parent.id).collect();

    let mut graph = DotGraph::new();
    let sheet_node = graph.node(
        sheet.as_str(),
        DotNode {
            label: label.to_string(),
            category: Category::Sheet,
            highlighted: false,
        },
    );
    for field in users.iter().filter(|f| !parents.contains(&f.id)) {
        let idx = graph.node(field.id.as_str(), field_node(field, true, false));
        graph.edge(idx, sheet_node);
    }
    for (parent, child) in internal {
        let from = graph.node(parent.id.as_str(), field_node(parent, true, false));
        let to = graph.node(child.id.as_str(), field_node(child, true, false));
        graph.edge(from, to);
    }
    graph.render()
}

/// Number of documents written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub field_graphs: usize,
    pub sheet_graphs: usize,
}

/// Path of a field's graph under `graphs_dir`.
pub fn field_graph_path(graphs_dir: &Path, field: &Field) -> PathBuf {
    graphs_dir
        .join(sanitize_file_stem(&field.source_label))
        .join(format!("{}.dot", sanitize_file_stem(&field.field_label)))
}

/// Path of a sheet's graph under `graphs_dir`.
pub fn sheet_graph_path(graphs_dir: &Path, label: &str) -> PathBuf {
    graphs_dir.join(SHEETS_GRAPH_DIR).join(format!("{}.dot", sanitize_file_stem(label)))
}

/// Write every field graph and every sheet graph below `<out_dir>/Graphs`.
///
/// `cancel` is checked before each document.
pub fn write_graphs(
    catalog: &Catalog,
    lineages: &[FieldLineage],
    out_dir: &Path,
    cancel: &CancellationFlag,
    show_progress: bool,
) -> Result<GraphStats, LineageError> {
    let graphs_dir = out_dir.join(GRAPHS_DIR);
    let mut stats = GraphStats::default();

    let progress = ProgressBar::with_visibility(lineages.len() as u64, show_progress);
    progress.set_prefix("Field graphs");
    for lineage in lineages {
        cancel.check()?;
        if let (Some(field), Some(document)) =
            (catalog.get(&lineage.field), field_graph(catalog, lineage))
        {
            let path = field_graph_path(&graphs_dir, field);
            check_path_length(&path)?;
            atomic_write(&path, document.as_bytes())?;
            stats.field_graphs += 1;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let progress = ProgressBar::with_visibility(catalog.sheets().len() as u64, show_progress);
    progress.set_prefix("Sheet graphs");
    for (sheet, label) in catalog.sheets().iter() {
        cancel.check()?;
        let path = sheet_graph_path(&graphs_dir, label);
        check_path_length(&path)?;
        atomic_write(&path, sheet_graph(catalog, sheet).as_bytes())?;
        stats.sheet_graphs += 1;
        progress.inc(1);
    }
    progress.finish_and_clear();

    debug!("Wrote {} field graphs and {} sheet graphs", stats.field_graphs, stats.sheet_graphs);
    Ok(stats)
}
