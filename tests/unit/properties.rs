use calclineage_cli::calculation::CalculationNormalizer;
use calclineage_cli::catalog::Catalog;
use calclineage_cli::core::{FieldId, Node};
use calclineage_cli::identity::{IdAllocator, IdentityOptions};
use calclineage_cli::resolver::{FieldGraph, resolve_all};
use calclineage_cli::test_utils::WorkbookBuilder;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn normalizer() -> CalculationNormalizer {
    CalculationNormalizer::new(
        vec![
            ("[Sales].[Profit]".to_string(), FieldId::new("[qv0]")),
            ("[Sales].[Revenue]".to_string(), FieldId::new("[qv1]")),
            ("[Costs].[Profit]".to_string(), FieldId::new("[qv2]")),
            ("[Parameters].[Rate]".to_string(), FieldId::new("[qv3]")),
            ("[Sales].[Profit]]x]".to_string(), FieldId::new("[qv4]")),
        ],
        ["[Profit]", "[Revenue]", "[Rate]", "[Profit]]x]"].map(String::from),
    )
}

fn calculation_token() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "[Profit]",
        "[Revenue]",
        "[Rate]",
        "[Other]",
        "[Costs].[Profit]",
        "[Parameters].[Rate]",
        "[Elsewhere].[Profit]",
        "[Profit]]x]",
        "[Sales].[Profit]]x]",
        "[Costs].[Profit]]x]",
        "SUM(",
        ")",
        "{FIXED",
        ":",
        "}",
        "+",
        "*",
        "1.5",
        "'text'",
    ])
}

/// Fields `[F0]..[Fn]` where each calculation only uses earlier fields.
fn acyclic_workbook() -> impl Strategy<Value = WorkbookBuilder> {
    (2usize..9)
        .prop_flat_map(|n| prop::collection::vec(prop::collection::vec(any::<bool>(), n), n))
        .prop_map(|matrix| {
            let mut builder = WorkbookBuilder::new().source("S", "");
            for (i, row) in matrix.iter().enumerate() {
                let calculation = (0..i)
                    .filter(|&j| row[j])
                    .map(|j| format!("[F{j}]"))
                    .collect::<Vec<_>>()
                    .join(" + ");
                builder = builder.calculated(&format!("[F{i}]"), "", &calculation, &[]);
            }
            builder
        })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(
        tokens in prop::collection::vec(calculation_token(), 0..12),
        source in prop::sample::select(vec!["[Sales]", "[Costs]", "[Parameters]"]),
    ) {
        let normalizer = normalizer();
        let text = tokens.join(" ");
        let once = normalizer.normalize(&text, source);
        let twice = normalizer.normalize(&once, source);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn escaped_names_keep_their_own_id(
        tokens in prop::collection::vec(
            prop::sample::select(vec!["[Profit]]x]", "[Sales].[Profit]]x]", "+"]),
            1..8,
        ),
    ) {
        let text = tokens.join(" ");
        let normalized = normalizer().normalize(&text, "[Sales]");
        prop_assert!(!normalized.contains("[qv0]"));
        let references = tokens.iter().filter(|t| **t != "+").count();
        prop_assert_eq!(normalized.matches("[qv4]").count(), references);
    }

    #[test]
    fn field_and_sheet_ids_are_disjoint(
        salt in "[a-z]{1,6}",
        fields in 0usize..300,
        sheets in 0usize..50,
    ) {
        let allocator = IdAllocator::new(salt);
        let ids: Vec<String> = (0..fields)
            .map(|n| allocator.field_id(n).as_str().to_string())
            .chain((0..sheets).map(|n| allocator.sheet_id(n).as_str().to_string()))
            .collect();
        prop_assert!(IdAllocator::verify_disjoint(ids.iter().map(String::as_str)).is_ok());
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                prop_assert!(!a.contains(b.as_str()) && !b.contains(a.as_str()));
            }
        }
    }

    #[test]
    fn closures_agree_with_reachability(workbook in acyclic_workbook()) {
        let catalog = Catalog::build(&workbook.build(), &IdentityOptions::default()).unwrap();
        let graph = FieldGraph::new(&catalog);
        let lineages = resolve_all(&graph).unwrap();

        for (position, lineage) in lineages.iter().enumerate() {
            let parents: BTreeSet<usize> =
                lineage.backward.iter().filter_map(|e| graph.position(&e.parent)).collect();
            prop_assert_eq!(parents, graph.upstream(position));

            let children: BTreeSet<usize> = lineage
                .forward
                .iter()
                .filter_map(|e| match &e.child {
                    Node::Field(id) => graph.position(id),
                    Node::Sheet(_) => None,
                })
                .collect();
            prop_assert_eq!(children, graph.downstream(position));

            prop_assert!(lineage.backward.iter().all(|e| e.level < 0));
            prop_assert!(lineage.forward.iter().all(|e| e.level > 0));
        }
    }
}
