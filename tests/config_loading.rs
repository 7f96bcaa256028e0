// tests/config_loading.rs

mod common;
use crate::common::builders::{DefinitionBuilder, NodeConfigBuilder};

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use pipeline_dag::config::{PolicyKind, demo_definition, load_and_validate, parse_str};
use pipeline_dag::errors::PipelineError;
use pipeline_dag::sim::RunSimulator;
use pipeline_dag::types::{NodeKind, NodeStatus, Position};

fn write_pipeline(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn loads_nodes_in_declaration_order_with_defaults() {
    let file = write_pipeline(
        r#"
[pipeline]
name = "tiny"

[[node]]
id = "b"
kind = "transform"
after = ["a"]

[[node]]
id = "a"
name = "Source"
kind = "data"
position = { x = 10, y = 20.5 }
"#,
    );

    let definition = load_and_validate(file.path()).unwrap();
    assert_eq!(definition.name, "tiny");

    let graph = definition.build_graph().unwrap();
    let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);

    let b = graph.node("b").unwrap();
    assert_eq!(b.name, "b");
    assert_eq!(b.status, NodeStatus::Idle);
    assert_eq!(b.dependencies, vec!["a"]);
    assert_eq!(b.position, Position::default());

    let a = graph.node("a").unwrap();
    assert_eq!(a.kind, NodeKind::Data);
    assert_eq!(a.position, Position::new(10.0, 20.5));

    let sim = &definition.simulation;
    assert_eq!(sim.policy, PolicyKind::Random);
    assert_eq!(sim.seed, 42);
    assert_eq!(sim.min_duration, Duration::from_secs(2));
    assert_eq!(sim.max_duration, Duration::from_secs(5));
    assert_eq!(sim.time_scale, 1.0);
}

#[test]
fn dependency_cycle_returns_structured_error() {
    let file = write_pipeline(
        r#"
[[node]]
id = "A"
kind = "transform"
dependencies = ["B"]

[[node]]
id = "B"
kind = "transform"
dependencies = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(PipelineError::CycleDetected(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains("A") || msg.contains("B"));
        }
        Err(e) => panic!("Expected CycleDetected error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn duplicate_node_id_is_rejected() {
    let file = write_pipeline(
        r#"
[[node]]
id = "A"
kind = "data"

[[node]]
id = "A"
kind = "model"
"#,
    );

    match load_and_validate(file.path()) {
        Err(PipelineError::DuplicateId(id)) => assert_eq!(id, "A"),
        other => panic!("Expected DuplicateId, got: {:?}", other),
    }
}

#[test]
fn unknown_dependency_is_ignored() {
    let definition = parse_str(
        r#"
[[node]]
id = "A"
kind = "data"
dependencies = ["NonExistent"]
"#,
    )
    .unwrap();

    let graph = definition.build_graph().unwrap();
    assert_eq!(graph.edges().count(), 0);
    assert_eq!(graph.roots().count(), 1);
}

#[test]
fn transient_initial_status_is_rejected() {
    let result = parse_str(
        r#"
[[node]]
id = "A"
kind = "data"
status = "running"
"#,
    );

    match result {
        Err(PipelineError::ConfigError(msg)) => assert!(msg.contains("initial status")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn invalid_simulation_settings_are_rejected() {
    let cases = [
        ("min_duration = \"5s\"\nmax_duration = \"2s\"", "must not exceed"),
        ("failure_rate = 1.5", "failure_rate"),
        ("time_scale = -1.0", "time_scale"),
        ("min_duration = \"soon\"", "min_duration"),
        ("fail = [\"ghost\"]", "unknown node"),
    ];

    for (section, needle) in cases {
        let toml = format!("[simulation]\n{section}\n\n[[node]]\nid = \"A\"\nkind = \"data\"\n");
        match parse_str(&toml) {
            Err(PipelineError::ConfigError(msg)) => {
                assert!(msg.contains(needle), "{msg:?} should mention {needle:?}")
            }
            other => panic!("Expected ConfigError for {section:?}, got: {:?}", other),
        }
    }
}

#[test]
fn empty_pipeline_is_rejected() {
    let result = parse_str("[pipeline]\nname = \"empty\"\n");
    assert!(matches!(result, Err(PipelineError::ConfigError(_))));
}

#[test]
fn unknown_kind_is_a_toml_error() {
    let result = parse_str("[[node]]\nid = \"A\"\nkind = \"notebook\"\n");
    assert!(matches!(result, Err(PipelineError::TomlError(_))));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Pipeline.toml"));
    assert!(matches!(result, Err(PipelineError::IoError(_))));
}

#[test]
fn policy_section_builds_matching_policy() {
    let definition = parse_str(
        r#"
[simulation]
policy = "runtime-hint"
min_duration = "1s"
fail = ["B"]

[[node]]
id = "A"
kind = "data"
runtime = "3s"

[[node]]
id = "B"
kind = "model"
after = ["A"]
"#,
    )
    .unwrap();

    let mut sim = RunSimulator::new(definition.build_graph().unwrap(), definition.build_policy());
    sim.start_run().unwrap();
    sim.run_to_completion();

    assert_eq!(sim.status_of("A").unwrap(), NodeStatus::Success);
    assert_eq!(sim.status_of("B").unwrap(), NodeStatus::Failed);
    // A took its runtime hint, B the fallback.
    assert_eq!(sim.now(), Duration::from_secs(4));
}

#[test]
fn builder_definition_round_trips_through_validation() {
    let definition = DefinitionBuilder::new()
        .name("built")
        .seed(11)
        .with_node(NodeConfigBuilder::new("src", NodeKind::Data).status(NodeStatus::Success).build())
        .with_node(
            NodeConfigBuilder::new("out", NodeKind::Output)
                .name("Export")
                .after("src")
                .at(700.0, 200.0)
                .content_hash("q7r8s9t0")
                .build(),
        )
        .fail("out")
        .build();

    assert_eq!(definition.name, "built");
    assert_eq!(definition.simulation.seed, 11);
    assert_eq!(definition.simulation.fail, vec!["out"]);
    assert_eq!(definition.nodes().len(), 2);

    let graph = definition.build_graph().unwrap();
    assert_eq!(graph.node("out").unwrap().name, "Export");
    assert_eq!(graph.dependencies_of("out"), vec!["src"]);
}

#[test]
fn demo_pipeline_matches_dashboard_data() {
    let definition = demo_definition().unwrap();
    let graph = definition.build_graph().unwrap();

    assert_eq!(graph.len(), 5);
    let order: Vec<&str> = graph
        .topological_order()
        .unwrap()
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(
        order,
        vec!["data-1", "transform-1", "transform-2", "model-1", "output-1"]
    );

    assert_eq!(graph.dependencies_of("model-1"), vec!["transform-1", "transform-2"]);
    assert_eq!(graph.node("data-1").unwrap().status, NodeStatus::Success);
    assert_eq!(graph.node("transform-1").unwrap().runtime.as_deref(), Some("45.2s"));
    assert_eq!(graph.node("output-1").unwrap().position, Position::new(700.0, 200.0));
}

#[test]
fn demo_run_starts_with_transform_2() {
    let definition = demo_definition().unwrap();
    let mut sim = RunSimulator::new(definition.build_graph().unwrap(), definition.build_policy());

    let step = sim.start_run().unwrap();
    assert_eq!(step.started(), vec!["transform-2"]);

    sim.run_to_completion();
    assert!(sim.is_complete());
    assert_eq!(sim.summary().count(NodeStatus::Success), 5);
}
