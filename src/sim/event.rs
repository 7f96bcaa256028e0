// src/sim/event.rs

//! Transition events and step results produced by the simulator.

use std::fmt;
use std::time::Duration;

use crate::dag::NodeId;
use crate::types::NodeStatus;

/// A single node status change.
///
/// This is the seam between the state machine and anything that renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Run the transition belongs to. `0` means no run has started yet
    /// (only possible for `reset`).
    pub run_id: u64,
    pub node_id: NodeId,
    pub from: NodeStatus,
    pub to: NodeStatus,
    /// Simulated time at which the transition happened.
    pub at: Duration,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>8.3}s] run {} {}: {} -> {}",
            self.at.as_secs_f64(),
            self.run_id,
            self.node_id,
            self.from,
            self.to
        )
    }
}

/// Structured result of a single simulator command or step.
///
/// Useful for tests that drive the simulator by hand and want to assert on
/// exactly what changed.
#[derive(Debug, Clone, Default)]
pub struct SimStep {
    /// Run the step belongs to, if any run has started.
    pub run_id: Option<u64>,
    /// Transitions produced by this step, in the order they happened.
    pub events: Vec<TransitionEvent>,
    /// Whether this step moved the global state from `Running` to
    /// `Completed`.
    pub run_just_finished: bool,
}

impl SimStep {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && !self.run_just_finished
    }

    /// Ids of nodes that entered `status` during this step.
    pub fn entered(&self, status: NodeStatus) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.to == status)
            .map(|e| e.node_id.as_str())
            .collect()
    }

    pub fn started(&self) -> Vec<&str> {
        self.entered(NodeStatus::Running)
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.entered(NodeStatus::Skipped)
    }

    pub fn cancelled(&self) -> Vec<&str> {
        self.entered(NodeStatus::Cancelled)
    }
}
