//! Dependency resolution engine.
//!
//! Computes, for every field, the full backward (upstream) and forward
//! (downstream) transitive closure with distance levels and category tags.
//!
//! # Architecture
//!
//! - [`graph`]: the field graph, adjacency in both directions, cycle check
//! - [`backward`] / [`forward`]: recursive passes over canonical subtrees
//! - [`cache`]: per-pass memo tables, single-threaded or shared
//! - [`reduce`]: one edge per key at the closest level, max-level query
//! - [`parallel`]: the same resolution split across worker threads
//!
//! # Levels
//!
//! The resolved root sits at level 0. Backward edges count hops upward as
//! negative levels; forward edges count hops downward as positive levels,
//! with the root's own worksheet edges at 0.
//!
//! # Example
//!
//! ```rust,no_run
//! use calclineage_cli::catalog::Catalog;
//! use calclineage_cli::identity::IdentityOptions;
//! use calclineage_cli::model::RawWorkbook;
//! use calclineage_cli::resolver::{FieldGraph, resolve_all};
//!
//! # fn example(workbook: RawWorkbook) -> anyhow::Result<()> {
//! let catalog = Catalog::build(&workbook, &IdentityOptions::default())?;
//! let graph = FieldGraph::new(&catalog);
//! for lineage in resolve_all(&graph)? {
//!     println!("{}: {} upstream", lineage.field, lineage.backward.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backward;
pub mod cache;
pub mod edge;
pub mod forward;
pub mod graph;
pub mod parallel;
pub mod reduce;

pub use backward::BackwardPass;
pub use cache::{CanonicalCache, LocalCache, SharedCache};
pub use edge::{CanonicalEdge, CanonicalSubtree, DependencyEdge};
pub use forward::ForwardPass;
pub use graph::FieldGraph;
pub use parallel::resolve_all_parallel;
pub use reduce::{max_level, reduce_backward, reduce_forward, reduce_unique};

use crate::core::{FieldId, LineageError};
use tracing::debug;

/// Reduced backward and forward closures of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLineage {
    pub field: FieldId,
    pub backward: Vec<DependencyEdge>,
    pub forward: Vec<DependencyEdge>,
}

/// Resolve every field of the graph on the current thread.
///
/// Cycles are reported up front. Results are in catalog order.
pub fn resolve_all(graph: &FieldGraph<'_>) -> Result<Vec<FieldLineage>, LineageError> {
    graph.detect_cycles()?;

    let mut backward = BackwardPass::new(graph, LocalCache::new());
    let mut forward = ForwardPass::new(graph, LocalCache::new());
    let lineages = resolve_roots(graph, 0..graph.node_count(), &mut backward, &mut forward)?;

    debug!(
        "Resolved {} fields ({} backward / {} forward canonical subtrees)",
        lineages.len(),
        backward.cached(),
        forward.cached()
    );
    Ok(lineages)
}

/// Resolve one field with fresh caches.
pub fn resolve_one(graph: &FieldGraph<'_>, field: &FieldId) -> Result<FieldLineage, LineageError> {
    let mut backward = BackwardPass::new(graph, LocalCache::new());
    let mut forward = ForwardPass::new(graph, LocalCache::new());
    Ok(FieldLineage {
        field: field.clone(),
        backward: reduce_backward(backward.resolve(field)?),
        forward: reduce_forward(forward.resolve(field)?),
    })
}

pub(crate) fn resolve_roots<'g, B, F>(
    graph: &'g FieldGraph<'g>,
    roots: impl IntoIterator<Item = usize>,
    backward: &mut BackwardPass<'g, B>,
    forward: &mut ForwardPass<'g, F>,
) -> Result<Vec<FieldLineage>, LineageError>
where
    B: CanonicalCache,
    F: CanonicalCache,
{
    roots
        .into_iter()
        .map(|position| {
            let id = &graph.field(position).id;
            Ok(FieldLineage {
                field: id.clone(),
                backward: reduce_backward(backward.resolve(id)?),
                forward: reduce_forward(forward.resolve(id)?),
            })
        })
        .collect()
}
