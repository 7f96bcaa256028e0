// src/dag/node.rs

//! Pipeline node data model.

use crate::types::{NodeKind, NodeStatus, Position};

/// Canonical node identifier type used throughout the crate.
pub type NodeId = String;

/// A unit of pipeline work with a status and a dependency list.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Display label.
    pub name: String,
    pub kind: NodeKind,
    /// Current run state. Mutated in place by the run simulator.
    pub status: NodeStatus,
    /// Ids that must reach `Success` before this node may start.
    ///
    /// Ids that do not resolve to a node in the graph are ignored.
    pub dependencies: Vec<NodeId>,
    pub position: Position,
    /// Opaque fingerprint, display only.
    pub content_hash: Option<String>,
    /// Human readable duration such as `"45.2s"`, display only.
    pub runtime: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            status: NodeStatus::Idle,
            dependencies: Vec::new(),
            position: Position::default(),
            content_hash: None,
            runtime: None,
        }
    }

    pub fn after(mut self, dep: impl Into<NodeId>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }
}
