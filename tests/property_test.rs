// Property tests: score bounds and render determinism

use docmap::model::{ClassNode, DiagramKind, Relationship, RelationshipKind};
use docmap::{DiagramConfig, DiagramRenderer, RelationshipGraph, Scanner};
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::Path;

fn params_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 0..=5)
        .prop_map(|names| names.into_iter().map(|n| format!("p_{}", n)).collect())
}

fn docstring_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[A-Za-z ,.]{0,160}",
        ("[A-Za-z ]{1,40}", prop::collection::vec("[a-z_]{1,8}", 0..=4)).prop_map(|(summary, args)| {
            let mut doc = format!("{}.\n\n    Args:\n", summary);
            for arg in args {
                doc.push_str(&format!("        p_{}: Value.\n", arg));
            }
            doc.push_str("\n    Returns:\n        Result.\n    ");
            doc
        }),
    ]
}

fn graph_strategy() -> impl Strategy<Value = RelationshipGraph> {
    (
        1usize..=25,
        prop::collection::vec((0usize..30, 0usize..30, 0usize..6), 0..=40),
        prop::collection::vec(0usize..3, 25),
    )
        .prop_map(|(count, edges, packages)| {
            let mut graph = RelationshipGraph::new();
            for i in 0..count {
                let name = if i % 7 == 6 { format!("_C{}", i) } else { format!("C{}", i) };
                graph.add_node(ClassNode::new(&name, &format!("pkg{}", packages[i])));
            }
            for (source, target, kind) in edges {
                let source = format!("C{}", source);
                let target = format!("C{}", target);
                graph.add_edge(Relationship::new(&source, &target, RelationshipKind::ORDER[kind]));
            }
            graph
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Scores stay within 0..=100 and carry one decimal
    #[test]
    fn prop_scores_bounded(params in params_strategy(), doc in docstring_strategy(), typed in any::<bool>()) {
        let params: Vec<String> = params
            .iter()
            .map(|p| if typed { format!("{}: int", p) } else { p.clone() })
            .collect();
        let source = format!("def f({}):\n    \"\"\"{}\"\"\"\n    pass\n", params.join(", "), doc);

        let mut scanner = Scanner::new().unwrap();
        let items = scanner.scan(&source, Path::new("m.py")).unwrap();
        prop_assert_eq!(items.len(), 1);

        for score in [items[0].coverage_score, items[0].quality_score] {
            prop_assert!((0.0..=100.0).contains(&score), "score out of range: {}", score);
            prop_assert!(((score * 10.0).round() - score * 10.0).abs() < 1e-6);
        }
    }

    /// Rendering is byte-identical and never references a filtered class
    #[test]
    fn prop_render_deterministic_and_closed(
        graph in graph_strategy(),
        max_classes in 1usize..=30,
        grouping in any::<bool>(),
        private in any::<bool>(),
    ) {
        let config = DiagramConfig::new(DiagramKind::ClassDetailed)
            .with_max_classes(max_classes)
            .with_grouping(grouping)
            .with_private(private);
        let renderer = DiagramRenderer::new();

        let first = renderer.render(&graph, &config);
        let second = renderer.render(&graph, &config);
        prop_assert_eq!(&first, &second);

        let declared: HashSet<String> = first
            .lines()
            .map(str::trim)
            .filter_map(|l| l.strip_prefix("class "))
            .filter_map(|l| l.split_whitespace().next())
            .map(str::to_string)
            .collect();
        prop_assert!(declared.len() <= max_classes);

        for line in first.lines().filter(|l| l.contains(" --|> ") || l.contains(" ..|> ")
            || l.contains(" *-- ") || l.contains(" o-- ") || l.contains(" --> ") || l.contains(" ..> "))
        {
            let parts: Vec<&str> = line.split_whitespace().collect();
            prop_assert!(declared.contains(parts[0]), "undeclared source in {}", line);
            prop_assert!(declared.contains(parts[2]), "undeclared target in {}", line);
        }

        let summary = renderer.summary(&graph, &config);
        prop_assert_eq!(summary.classes_found, declared.len());
    }
}
