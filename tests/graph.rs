// tests/graph.rs

mod common;
use crate::common::builders::GraphBuilder;
use crate::common::{chain_abc, diamond};

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use pipeline_dag::dag::{Edge, Node, PipelineGraph};
use pipeline_dag::errors::PipelineError;
use pipeline_dag::types::NodeKind;

fn ids<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a str> {
    nodes.into_iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn duplicate_id_is_rejected_and_graph_unchanged() {
    let mut graph = chain_abc();

    let result = graph.add_node(Node::new("B", "Another B", NodeKind::Model));

    match result {
        Err(PipelineError::DuplicateId(id)) => assert_eq!(id, "B"),
        other => panic!("Expected DuplicateId, got: {:?}", other),
    }
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.node("B").unwrap().name, "B");
}

#[test]
fn self_dependency_is_a_cycle() {
    let result = PipelineGraph::from_nodes([Node::new("A", "A", NodeKind::Data).after("A")]);

    match result {
        Err(PipelineError::CycleDetected(msg)) => assert!(msg.contains("'A'")),
        other => panic!("Expected CycleDetected, got: {:?}", other),
    }
}

#[test]
fn node_closing_a_cycle_is_rolled_back() {
    let mut graph = PipelineGraph::new();
    // "B" is unknown when A is added, so the dependency is dormant.
    graph
        .add_node(Node::new("A", "A", NodeKind::Transform).after("B"))
        .unwrap();
    assert_eq!(graph.edges().count(), 0);

    let result = graph.add_node(Node::new("B", "B", NodeKind::Transform).after("A"));

    assert!(
        matches!(result, Err(PipelineError::CycleDetected(_))),
        "got {:?}",
        result
    );
    assert_eq!(graph.len(), 1);
    assert!(!graph.contains("B"));
    assert!(graph.topological_order().is_ok());
}

#[test]
fn edges_skip_missing_dependencies_and_duplicates() {
    let graph = GraphBuilder::new()
        .node("A", &[])
        .node("B", &["A", "ghost", "A"])
        .build();

    let edges: Vec<Edge<'_>> = graph.edges().collect();
    assert_eq!(edges, vec![Edge { from: "A", to: "B" }]);
    assert_eq!(graph.dependencies_of("B"), vec!["A"]);
    // The declared list is kept as-is.
    assert_eq!(graph.node("B").unwrap().dependencies.len(), 3);
}

#[test]
fn edges_follow_declaration_order() {
    let graph = diamond();

    let edges: Vec<(&str, &str)> = graph.edges().map(|e| (e.from, e.to)).collect();
    assert_eq!(
        edges,
        vec![("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]
    );
}

#[test]
fn dependents_and_roots() {
    let graph = diamond();

    assert_eq!(graph.dependents_of("A"), vec!["B", "C"]);
    assert_eq!(graph.dependents_of("D"), Vec::<&str>::new());
    assert_eq!(graph.transitive_dependents_of("A"), vec!["B", "C", "D"]);
    assert_eq!(graph.transitive_dependents_of("B"), vec!["D"]);
    assert_eq!(ids(graph.roots()), vec!["A"]);
}

#[test]
fn node_with_only_unknown_dependencies_is_a_root() {
    let graph = GraphBuilder::new()
        .node("A", &["missing"])
        .node("B", &["A"])
        .build();

    assert_eq!(ids(graph.roots()), vec!["A"]);
}

#[test]
fn topological_order_breaks_ties_by_declaration_order() {
    let graph = GraphBuilder::new()
        .node("C", &[])
        .node("A", &[])
        .node("B", &["C"])
        .build();

    assert_eq!(ids(graph.topological_order().unwrap()), vec!["C", "A", "B"]);
}

#[test]
fn topological_order_puts_dependency_first_even_if_declared_later() {
    let graph = GraphBuilder::new().node("B", &["A"]).node("A", &[]).build();

    assert_eq!(ids(graph.topological_order().unwrap()), vec!["A", "B"]);
}

#[test]
fn empty_graph_has_empty_order() {
    let graph = PipelineGraph::new();
    assert!(graph.is_empty());
    assert!(graph.topological_order().unwrap().is_empty());
    assert_eq!(graph.edges().count(), 0);
}

// Strategy to generate an acyclic node list: node N may only depend on
// nodes 0..N, plus the occasional id that is never declared.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<Node>> {
    (1..=max_nodes).prop_flat_map(|num_nodes| {
        proptest::collection::vec(
            (
                proptest::collection::vec(any::<usize>(), 0..4),
                any::<bool>(),
            ),
            num_nodes,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (deps, dangling))| {
                    let mut node = Node::new(format!("n{i}"), format!("node {i}"), NodeKind::Transform);
                    if i > 0 {
                        let unique: HashSet<usize> = deps.into_iter().map(|d| d % i).collect();
                        for d in unique {
                            node = node.after(format!("n{d}"));
                        }
                    }
                    if dangling {
                        node = node.after("not-declared");
                    }
                    node
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn topological_order_respects_every_edge(nodes in dag_strategy(12)) {
        let graph = PipelineGraph::from_nodes(nodes).unwrap();
        let order = graph.topological_order().unwrap();

        prop_assert_eq!(order.len(), graph.len());

        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        for edge in graph.edges() {
            prop_assert!(position[edge.from] < position[edge.to]);
        }
    }

    #[test]
    fn edges_never_mention_undeclared_ids(nodes in dag_strategy(12)) {
        let graph = PipelineGraph::from_nodes(nodes).unwrap();
        for edge in graph.edges() {
            prop_assert!(graph.contains(edge.from));
            prop_assert!(graph.contains(edge.to));
        }
    }
}
