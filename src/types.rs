use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Role a node plays in the pipeline. Purely descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Data,
    Transform,
    Model,
    Output,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Data => "data",
            NodeKind::Transform => "transform",
            NodeKind::Model => "model",
            NodeKind::Output => "output",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "data" => Ok(NodeKind::Data),
            "transform" => Ok(NodeKind::Transform),
            "model" => Ok(NodeKind::Model),
            "output" => Ok(NodeKind::Output),
            other => Err(format!(
                "invalid node kind: {other} (expected data, transform, model or output)"
            )),
        }
    }
}

/// Run status of a single node.
///
/// `Skipped` and `Cancelled` are terminal states reached without running:
/// the first when an upstream node failed, the second when the run was
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
    Cancelled,
}

impl NodeStatus {
    /// Every status, in display order.
    pub const ALL: [NodeStatus; 7] = [
        NodeStatus::Idle,
        NodeStatus::Pending,
        NodeStatus::Running,
        NodeStatus::Success,
        NodeStatus::Failed,
        NodeStatus::Skipped,
        NodeStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Pending => "pending",
            NodeStatus::Running => "running",
            NodeStatus::Success => "success",
            NodeStatus::Failed => "failed",
            NodeStatus::Skipped => "skipped",
            NodeStatus::Cancelled => "cancelled",
        }
    }

    /// `Pending` and `Running` are the only states a run can be waiting on.
    pub fn is_transient(self) -> bool {
        matches!(self, NodeStatus::Pending | NodeStatus::Running)
    }

    /// States a node can end a run cycle in.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeStatus::Success | NodeStatus::Failed | NodeStatus::Skipped | NodeStatus::Cancelled
        )
    }

    /// Whether the simulator is allowed to move a node from `self` to `next`.
    ///
    /// `reset` is the only way back to `Idle` and is allowed from anywhere.
    pub fn can_transition_to(self, next: NodeStatus) -> bool {
        use NodeStatus::*;

        match (self, next) {
            (_, Idle) => true,
            (Idle | Failed | Skipped | Cancelled, Pending) => true,
            (Pending, Running) => true,
            (Running, Success | Failed) => true,
            (Pending, Skipped) => true,
            (Pending | Running, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        NodeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| format!("invalid node status: {needle}"))
    }
}

/// Global state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run in progress (never started, cancelled or reset).
    Idle,
    /// At least one node is pending or running.
    Running,
    /// Every node that took part in the last run is terminal.
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// 2D layout coordinate. Owned by the layout step; the simulator never
/// touches it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
