#![allow(dead_code)]

pub use pipeline_dag_test_utils::builders;
pub use pipeline_dag_test_utils::recording_policy::RecordingPolicy;
pub use pipeline_dag_test_utils::{init_tracing, with_timeout};

use std::time::Duration;

use pipeline_dag::dag::PipelineGraph;
use pipeline_dag::sim::{FixedPolicy, RunSimulator};

use self::builders::GraphBuilder;

pub const SEC: Duration = Duration::from_secs(1);

/// A -> B -> C
pub fn chain_abc() -> PipelineGraph {
    GraphBuilder::new()
        .node("A", &[])
        .node("B", &["A"])
        .node("C", &["B"])
        .build()
}

/// A -> {B, C} -> D
pub fn diamond() -> PipelineGraph {
    GraphBuilder::new()
        .node("A", &[])
        .node("B", &["A"])
        .node("C", &["A"])
        .node("D", &["B", "C"])
        .build()
}

pub fn fixed_sim(graph: PipelineGraph, policy: FixedPolicy) -> RunSimulator<FixedPolicy> {
    RunSimulator::new(graph, policy)
}
