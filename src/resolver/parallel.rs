//! Parallel resolution across worker threads.
//!
//! Roots are split into contiguous chunks, one per worker. Workers share one
//! backward and one forward [`SharedCache`]; because canonical subtrees are
//! root-independent, whichever worker freezes a field first stores the same
//! entry any other would have, and results match the sequential run exactly.

use super::cache::SharedCache;
use super::{BackwardPass, FieldGraph, FieldLineage, ForwardPass, resolve_all, resolve_roots};
use crate::core::LineageError;
use tracing::debug;

/// Resolve every field using up to `workers` threads.
///
/// Falls back to [`resolve_all`] for a single worker or a tiny graph.
/// Results are in catalog order.
pub fn resolve_all_parallel(
    graph: &FieldGraph<'_>,
    workers: usize,
) -> Result<Vec<FieldLineage>, LineageError> {
    let total = graph.node_count();
    let workers = workers.clamp(1, total.max(1));
    if workers == 1 {
        return resolve_all(graph);
    }

    graph.detect_cycles()?;

    let backward_cache = SharedCache::new();
    let forward_cache = SharedCache::new();
    let chunk = total.div_ceil(workers);
    debug!("Resolving {} fields on {} workers ({} per worker)", total, workers, chunk);

    let chunks: Vec<Result<Vec<FieldLineage>, LineageError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let start = (worker * chunk).min(total);
                let end = ((worker + 1) * chunk).min(total);
                let (backward_cache, forward_cache) = (&backward_cache, &forward_cache);
                scope.spawn(move || {
                    let mut backward = BackwardPass::new(graph, backward_cache);
                    let mut forward = ForwardPass::new(graph, forward_cache);
                    resolve_roots(graph, start..end, &mut backward, &mut forward)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(LineageError::Other {
                        message: "Resolution worker panicked".to_string(),
                    })
                })
            })
            .collect()
    });

    let mut lineages = Vec::with_capacity(total);
    for chunk in chunks {
        lineages.extend(chunk?);
    }
    Ok(lineages)
}
