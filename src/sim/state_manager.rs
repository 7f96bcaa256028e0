// src/sim/state_manager.rs

//! Per-run node state transitions.

use std::time::Duration;

use tracing::{debug, warn};

use crate::dag::{Node, NodeId, PipelineGraph};
use crate::sim::event::TransitionEvent;
use crate::types::NodeStatus;

/// Applies status transitions to the graph and records an event for each.
pub struct StateManager<'a> {
    graph: &'a mut PipelineGraph,
    events: &'a mut Vec<TransitionEvent>,
    run_id: u64,
    now: Duration,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a mut PipelineGraph,
        events: &'a mut Vec<TransitionEvent>,
        run_id: u64,
        now: Duration,
    ) -> Self {
        Self {
            graph,
            events,
            run_id,
            now,
        }
    }

    /// Move a node to `next`, recording the transition.
    ///
    /// Returns `false` (and records nothing) if the node is unknown, already
    /// in `next`, or the move is not a legal transition.
    pub fn set_status(&mut self, id: &str, next: NodeStatus) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            warn!(node = %id, "status change for unknown node; ignoring");
            return false;
        };

        let from = node.status;
        if from == next {
            return false;
        }

        if !from.can_transition_to(next) {
            warn!(node = %id, %from, to = %next, "illegal status transition; ignoring");
            return false;
        }

        node.status = next;
        debug!(node = %id, run_id = self.run_id, %from, to = %next, "status changed");

        self.events.push(TransitionEvent {
            run_id: self.run_id,
            node_id: id.to_string(),
            from,
            to: next,
            at: self.now,
        });
        true
    }

    /// Put every node that has not already succeeded into `Pending`.
    pub fn mark_run_pending(&mut self) -> Vec<NodeId> {
        let ids = self.ids_where(|n| n.status != NodeStatus::Success);
        self.apply_all(ids, NodeStatus::Pending)
    }

    /// Move every `Pending` node whose dependencies all succeeded to
    /// `Running`, returning their ids in declaration order.
    pub fn collect_new_ready(&mut self) -> Vec<NodeId> {
        // Decide first, then mutate.
        let graph = &*self.graph;
        let ready: Vec<NodeId> = graph
            .nodes()
            .filter(|n| n.status == NodeStatus::Pending && deps_satisfied(graph, n))
            .map(|n| n.id.clone())
            .collect();

        self.apply_all(ready, NodeStatus::Running)
    }

    /// Skip every `Pending` node that transitively depends on `failed`.
    ///
    /// Such nodes never enter `Running` in this run.
    pub fn mark_dependents_skipped(&mut self, failed: &str) -> Vec<NodeId> {
        let graph = &*self.graph;
        let ids: Vec<NodeId> = graph
            .transitive_dependents_of(failed)
            .into_iter()
            .filter(|id| {
                graph
                    .node(id)
                    .is_some_and(|n| n.status == NodeStatus::Pending)
            })
            .map(|id| id.to_string())
            .collect();

        if !ids.is_empty() {
            debug!(node = %failed, skipped = ?ids, "upstream failure; skipping dependents");
        }

        self.apply_all(ids, NodeStatus::Skipped)
    }

    /// Cancel every `Pending` or `Running` node.
    pub fn cancel_transient(&mut self) -> Vec<NodeId> {
        let ids = self.ids_where(|n| n.status.is_transient());
        self.apply_all(ids, NodeStatus::Cancelled)
    }

    /// Return every node to `Idle`.
    pub fn reset_all(&mut self) -> Vec<NodeId> {
        let ids = self.ids_where(|n| n.status != NodeStatus::Idle);
        self.apply_all(ids, NodeStatus::Idle)
    }

    /// `true` once no node is `Pending` or `Running`.
    pub fn all_terminal(&self) -> bool {
        !self.graph.nodes().any(|n| n.status.is_transient())
    }

    fn ids_where(&self, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|&n| pred(n))
            .map(|n| n.id.clone())
            .collect()
    }

    fn apply_all(&mut self, ids: Vec<NodeId>, next: NodeStatus) -> Vec<NodeId> {
        ids.into_iter()
            .filter(|id| self.set_status(id, next))
            .collect()
    }
}

/// Whether every resolved dependency of `node` has succeeded.
///
/// Dependencies on ids that are not in the graph are ignored.
pub fn deps_satisfied(graph: &PipelineGraph, node: &Node) -> bool {
    node.dependencies.iter().all(|dep| match graph.node(dep) {
        Some(d) => d.status == NodeStatus::Success,
        None => true,
    })
}
