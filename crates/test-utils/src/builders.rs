#![allow(dead_code)]

use pipeline_dag::config::{NodeConfig, PipelineDefinition, RawPipelineFile};
use pipeline_dag::dag::{Node, PipelineGraph};
use pipeline_dag::types::{NodeKind, NodeStatus, Position};

/// Builder for `PipelineGraph` to simplify test setup.
///
/// Nodes default to `NodeKind::Transform`; the first node that has no
/// dependencies is usually what a test wants to treat as the data source,
/// but the kind never affects simulation.
pub struct GraphBuilder {
    nodes: Vec<Node>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node with the given dependencies.
    pub fn node(mut self, id: &str, deps: &[&str]) -> Self {
        let node = Node::new(id, id, NodeKind::Transform).with_dependencies(deps.iter().copied());
        self.nodes.push(node);
        self
    }

    pub fn node_with(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn build(self) -> PipelineGraph {
        PipelineGraph::from_nodes(self.nodes).expect("Failed to build valid graph from builder")
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawPipelineFile` / `PipelineDefinition`.
pub struct DefinitionBuilder {
    raw: RawPipelineFile,
}

impl DefinitionBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawPipelineFile::default(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.raw.pipeline.name = Some(name.to_string());
        self
    }

    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.raw.nodes.push(node);
        self
    }

    pub fn fail(mut self, id: &str) -> Self {
        self.raw.simulation.fail.push(id.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.raw.simulation.seed = seed;
        self
    }

    pub fn raw(self) -> RawPipelineFile {
        self.raw
    }

    pub fn build(self) -> PipelineDefinition {
        PipelineDefinition::try_from(self.raw).expect("Failed to build valid definition from builder")
    }
}

impl Default for DefinitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `NodeConfig`.
pub struct NodeConfigBuilder {
    node: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn new(id: &str, kind: NodeKind) -> Self {
        Self {
            node: NodeConfig {
                id: id.to_string(),
                name: None,
                kind,
                status: None,
                dependencies: vec![],
                position: None,
                content_hash: None,
                runtime: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.node.name = Some(name.to_string());
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.node.dependencies.push(dep.to_string());
        self
    }

    pub fn status(mut self, status: NodeStatus) -> Self {
        self.node.status = Some(status);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.node.position = Some(Position::new(x, y));
        self
    }

    pub fn content_hash(mut self, hash: &str) -> Self {
        self.node.content_hash = Some(hash.to_string());
        self
    }

    pub fn runtime(mut self, runtime: &str) -> Self {
        self.node.runtime = Some(runtime.to_string());
        self
    }

    pub fn build(self) -> NodeConfig {
        self.node
    }
}
