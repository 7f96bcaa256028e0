// src/config/model.rs

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::dag::{Node, NodeId, PipelineGraph};
use crate::errors::Result;
use crate::sim::{FixedPolicy, RandomPolicy, RuntimeHintPolicy, SimulationPolicy};
use crate::types::{NodeKind, NodeStatus, Position};

/// Pipeline definition as read from a TOML file, before validation.
///
/// ```toml
/// [pipeline]
/// name = "Clinical trial analysis"
///
/// [simulation]
/// policy = "random"
/// seed = 7
///
/// [[node]]
/// id = "data-1"
/// name = "Patient Data"
/// kind = "data"
///
/// [[node]]
/// id = "transform-1"
/// name = "Data Cleaning"
/// kind = "transform"
/// dependencies = ["data-1"]
/// ```
///
/// All sections are optional and have reasonable defaults; nodes keep their
/// declaration order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipelineFile {
    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub simulation: SimulationSection,

    /// All `[[node]]` tables, in declaration order.
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeConfig>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PipelineSection {
    #[serde(default)]
    pub name: Option<String>,
}

/// Which [`SimulationPolicy`] to build from a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Seeded random durations in `[min_duration, max_duration]`.
    #[default]
    Random,
    /// Every node takes `min_duration`.
    Fixed,
    /// Each node takes its recorded `runtime`, else `min_duration`.
    RuntimeHint,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(PolicyKind::Random),
            "fixed" => Ok(PolicyKind::Fixed),
            "runtime-hint" => Ok(PolicyKind::RuntimeHint),
            other => Err(format!(
                "invalid policy: {other} (expected \"random\", \"fixed\" or \"runtime-hint\")"
            )),
        }
    }
}

/// `[simulation]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Duration string such as `"2s"` or `"250ms"`.
    #[serde(default = "default_min_duration")]
    pub min_duration: String,

    #[serde(default = "default_max_duration")]
    pub max_duration: String,

    /// Probability in `0.0..=1.0` that a node fails (random policy only).
    #[serde(default)]
    pub failure_rate: f64,

    /// Node ids forced to fail, whatever the policy.
    #[serde(default)]
    pub fail: Vec<NodeId>,

    /// Wall-clock seconds per simulated second when played back by the
    /// engine. `0.0` plays back as fast as possible.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_seed() -> u64 {
    42
}

fn default_min_duration() -> String {
    "2s".to_string()
}

fn default_max_duration() -> String {
    "5s".to_string()
}

fn default_time_scale() -> f64 {
    1.0
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            seed: default_seed(),
            min_duration: default_min_duration(),
            max_duration: default_max_duration(),
            failure_rate: 0.0,
            fail: Vec::new(),
            time_scale: default_time_scale(),
        }
    }
}

/// `[[node]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub id: NodeId,

    /// Display label; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,

    pub kind: NodeKind,

    /// Initial status: `idle` (default), `success` or `failed`.
    #[serde(default)]
    pub status: Option<NodeStatus>,

    /// Ids this node waits for. Ids not declared anywhere are ignored.
    #[serde(default, alias = "after")]
    pub dependencies: Vec<NodeId>,

    #[serde(default)]
    pub position: Option<Position>,

    #[serde(default)]
    pub content_hash: Option<String>,

    #[serde(default)]
    pub runtime: Option<String>,
}

impl NodeConfig {
    pub fn to_node(&self) -> Node {
        Node {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            kind: self.kind,
            status: self.status.unwrap_or_default(),
            dependencies: self.dependencies.clone(),
            position: self.position.unwrap_or_default(),
            content_hash: self.content_hash.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

/// Simulation settings with durations parsed and values checked.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub policy: PolicyKind,
    pub seed: u64,
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub failure_rate: f64,
    pub fail: Vec<NodeId>,
    pub time_scale: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            seed: default_seed(),
            min_duration: RandomPolicy::DEFAULT_MIN,
            max_duration: RandomPolicy::DEFAULT_MAX,
            failure_rate: 0.0,
            fail: Vec::new(),
            time_scale: default_time_scale(),
        }
    }
}

/// A validated pipeline definition.
///
/// Only obtainable through `TryFrom<RawPipelineFile>` (see `validate.rs`),
/// so node ids are unique and the dependency relation is acyclic.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    pub name: String,
    pub simulation: SimulationSettings,
    nodes: Vec<NodeConfig>,
}

impl PipelineDefinition {
    pub(crate) fn new_unchecked(
        name: String,
        simulation: SimulationSettings,
        nodes: Vec<NodeConfig>,
    ) -> Self {
        Self {
            name,
            simulation,
            nodes,
        }
    }

    pub fn nodes(&self) -> &[NodeConfig] {
        &self.nodes
    }

    /// Build the pipeline graph described by this definition.
    pub fn build_graph(&self) -> Result<PipelineGraph> {
        PipelineGraph::from_nodes(self.nodes.iter().map(NodeConfig::to_node))
    }

    /// Build the policy selected in `[simulation]`.
    pub fn build_policy(&self) -> Box<dyn SimulationPolicy + Send> {
        let sim = &self.simulation;

        match sim.policy {
            PolicyKind::Random => {
                let mut policy = RandomPolicy::new(sim.seed)
                    .with_range(sim.min_duration, sim.max_duration)
                    .with_failure_rate(sim.failure_rate);
                for id in &sim.fail {
                    policy = policy.failing(id.clone());
                }
                Box::new(policy)
            }
            PolicyKind::Fixed => {
                let mut policy = FixedPolicy::new(sim.min_duration);
                for id in &sim.fail {
                    policy = policy.failing(id.clone());
                }
                Box::new(policy)
            }
            PolicyKind::RuntimeHint => {
                let mut policy = RuntimeHintPolicy::new(sim.min_duration);
                for id in &sim.fail {
                    policy = policy.failing(id.clone());
                }
                Box::new(policy)
            }
        }
    }
}
