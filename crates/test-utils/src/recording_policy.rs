use std::sync::{Arc, Mutex};

use pipeline_dag::dag::{Node, NodeId};
use pipeline_dag::sim::{FixedPolicy, NodePlan, SimulationPolicy};

/// A deterministic policy that:
/// - delegates every plan to a [`FixedPolicy`]
/// - records which nodes were started, in order.
pub struct RecordingPolicy {
    inner: FixedPolicy,
    started: Arc<Mutex<Vec<NodeId>>>,
}

impl RecordingPolicy {
    pub fn new(inner: FixedPolicy) -> Self {
        Self {
            inner,
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the list of started nodes, usable after the policy
    /// has been moved into a simulator.
    pub fn started(&self) -> Arc<Mutex<Vec<NodeId>>> {
        Arc::clone(&self.started)
    }
}

impl SimulationPolicy for RecordingPolicy {
    fn plan(&mut self, node: &Node) -> NodePlan {
        {
            let mut guard = self.started.lock().unwrap();
            guard.push(node.id.clone());
        }
        self.inner.plan(node)
    }
}
