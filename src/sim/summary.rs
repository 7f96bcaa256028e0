// src/sim/summary.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::dag::PipelineGraph;
use crate::types::NodeStatus;

/// Node counts per status, computed from a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSummary {
    counts: BTreeMap<NodeStatus, usize>,
    total: usize,
}

impl StatusSummary {
    pub fn of(graph: &PipelineGraph) -> Self {
        let mut counts = BTreeMap::new();
        for node in graph.nodes() {
            *counts.entry(node.status).or_insert(0) += 1;
        }
        Self {
            counts,
            total: graph.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, status: NodeStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Non-zero counts in display order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeStatus, usize)> + '_ {
        NodeStatus::ALL
            .into_iter()
            .map(|s| (s, self.count(s)))
            .filter(|(_, n)| *n > 0)
    }

    pub fn has_failures(&self) -> bool {
        self.count(NodeStatus::Failed) > 0
    }
}

/// Header line such as `5 nodes • 2 running • 1 pending`.
impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.total == 1 { "node" } else { "nodes" };
        write!(f, "{} {}", self.total, noun)?;

        const ORDER: [NodeStatus; 6] = [
            NodeStatus::Running,
            NodeStatus::Pending,
            NodeStatus::Success,
            NodeStatus::Failed,
            NodeStatus::Skipped,
            NodeStatus::Cancelled,
        ];

        for status in ORDER {
            let n = self.count(status);
            if n > 0 {
                write!(f, " • {} {}", n, status)?;
            }
        }
        Ok(())
    }
}
