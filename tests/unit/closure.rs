use crate::common::shop_workbook;
use calclineage_cli::catalog::Catalog;
use calclineage_cli::core::{Category, FieldId, Node};
use calclineage_cli::identity::IdentityOptions;
use calclineage_cli::resolver::{
    DependencyEdge, FieldGraph, reduce_backward, resolve_all, resolve_all_parallel, resolve_one,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

fn shop() -> Catalog {
    Catalog::build(&shop_workbook().build(), &IdentityOptions::default()).unwrap()
}

/// Hop distance from `start` to every reachable field.
fn distances(start: usize, next: impl Fn(usize) -> Vec<usize>) -> BTreeMap<usize, i32> {
    let mut seen = BTreeMap::new();
    let mut queue = VecDeque::from([(start, 0)]);
    while let Some((current, depth)) = queue.pop_front() {
        for neighbor in next(current) {
            if neighbor != start && !seen.contains_key(&neighbor) {
                seen.insert(neighbor, depth + 1);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }
    seen
}

/// Closest level per endpoint, picked by `endpoint`.
fn closest<'e>(
    edges: &'e [DependencyEdge],
    endpoint: impl Fn(&'e DependencyEdge) -> Option<&'e FieldId>,
) -> BTreeMap<&'e FieldId, i32> {
    let mut best: BTreeMap<&FieldId, i32> = BTreeMap::new();
    for edge in edges {
        if let Some(id) = endpoint(edge) {
            let level = edge.level.abs();
            best.entry(id).and_modify(|l| *l = (*l).min(level)).or_insert(level);
        }
    }
    best
}

#[test]
fn test_closures_match_breadth_first_traversal() {
    let catalog = shop();
    let graph = FieldGraph::new(&catalog);
    let lineages = resolve_all(&graph).unwrap();

    for (position, lineage) in lineages.iter().enumerate() {
        let upstream = distances(position, |p| graph.dependencies(p).to_vec());
        let expected: BTreeMap<&FieldId, i32> =
            upstream.iter().map(|(&p, &d)| (&graph.field(p).id, d)).collect();
        assert_eq!(closest(&lineage.backward, |e| Some(&e.parent)), expected);

        let downstream = distances(position, |p| graph.consumers(p).to_vec());
        let expected: BTreeMap<&FieldId, i32> =
            downstream.iter().map(|(&p, &d)| (&graph.field(p).id, d)).collect();
        let forward = closest(&lineage.forward, |e| match &e.child {
            Node::Field(id) => Some(id),
            Node::Sheet(_) => None,
        });
        assert_eq!(forward, expected);
    }
}

#[test]
fn test_reached_sets_match_graph_reachability() {
    let catalog = shop();
    let graph = FieldGraph::new(&catalog);

    for position in 0..graph.node_count() {
        let lineage = resolve_one(&graph, &graph.field(position).id).unwrap();
        let parents: BTreeSet<usize> =
            lineage.backward.iter().filter_map(|e| graph.position(&e.parent)).collect();
        assert_eq!(parents, graph.upstream(position));
    }
}

#[test]
fn test_region_margin_lineage() {
    let catalog = shop();
    let graph = FieldGraph::new(&catalog);
    let root = catalog.find("Region Margin").unwrap();
    let lineage = resolve_one(&graph, &root.id).unwrap();

    assert_eq!(lineage.backward.len(), 7);
    assert!(lineage.backward.iter().all(|e| e.level < 0 && e.sheets.is_none()));
    assert_eq!(lineage.backward.iter().map(|e| e.level).min(), Some(-3));

    let fields: BTreeSet<&str> = lineage
        .backward
        .iter()
        .filter(|e| e.category == Category::Field)
        .map(|e| catalog.get(&e.parent).unwrap().field_label.as_str())
        .collect();
    assert_eq!(fields, BTreeSet::from(["[Cost]", "[Region]", "[Sales]"]));

    let parameter = catalog.find("[Parameters].[Target]").unwrap();
    assert!(lineage.backward.iter().any(|e| e.parent == parameter.id
        && e.category == Category::Parameter
        && e.level == -2));
}

#[test]
fn test_reduction_keeps_one_edge_per_key() {
    let catalog = shop();
    let graph = FieldGraph::new(&catalog);

    for lineage in resolve_all(&graph).unwrap() {
        let keys: BTreeSet<(&Node, &FieldId, Category)> =
            lineage.backward.iter().map(|e| (&e.child, &e.parent, e.category)).collect();
        assert_eq!(keys.len(), lineage.backward.len());
        // reducing again changes nothing
        assert_eq!(reduce_backward(lineage.backward.clone()).len(), lineage.backward.len());
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let catalog = shop();
    let graph = FieldGraph::new(&catalog);
    let sequential = resolve_all(&graph).unwrap();
    for workers in [2, 3, 8] {
        assert_eq!(resolve_all_parallel(&graph, workers).unwrap(), sequential);
    }
}

#[test]
fn test_unknown_field_resolves_to_nothing() {
    let catalog = shop();
    let graph = FieldGraph::new(&catalog);
    let lineage = resolve_one(&graph, &FieldId::new("[nowhere]")).unwrap();
    assert!(lineage.backward.is_empty());
    assert!(lineage.forward.is_empty());
}
