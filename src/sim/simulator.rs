use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dag::{NodeId, PipelineGraph};
use crate::errors::{PipelineError, Result};
use crate::sim::event::{SimStep, TransitionEvent};
use crate::sim::policy::{NodeOutcome, SimulationPolicy};
use crate::sim::state_manager::{StateManager, deps_satisfied};
use crate::sim::summary::StatusSummary;
use crate::types::{NodeStatus, RunState};

/// A node completion waiting for simulated time to reach `at`.
///
/// Ordered by `(at, seq)` so nodes finishing at the same instant complete in
/// the order they were started.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    at: Duration,
    seq: u64,
    run_id: u64,
    node: NodeId,
    outcome: NodeOutcome,
}

/// Run simulator: owns the pipeline graph plus the per-run state machine.
///
/// It is responsible for:
/// - starting a run (`Pending` for every node that has not succeeded)
/// - starting nodes only once all of their dependencies succeeded
/// - completing running nodes when simulated time reaches their deadline
/// - skipping the transitive dependents of a failed node
/// - cancelling and resetting
///
/// The simulator is synchronous and never looks at the wall clock. Time
/// moves only when the caller advances it.
#[derive(Debug)]
pub struct RunSimulator<P: SimulationPolicy> {
    graph: PipelineGraph,
    policy: P,
    state: RunState,
    /// Monotonically increasing run id; `0` until the first run starts.
    run_counter: u64,
    now: Duration,
    seq: u64,
    scheduled: BinaryHeap<Reverse<Scheduled>>,
    /// Events not yet handed out by `drain_events`.
    events: Vec<TransitionEvent>,
}

impl<P: SimulationPolicy> RunSimulator<P> {
    /// Wrap a graph. Nodes left in `Pending` or `Running` by whoever built the
    /// graph are put back to `Idle`, since no run is in progress yet.
    pub fn new(mut graph: PipelineGraph, policy: P) -> Self {
        for node in graph.nodes_mut() {
            if node.status.is_transient() {
                warn!(node = %node.id, status = %node.status, "node starts in a transient state; resetting to idle");
                node.status = NodeStatus::Idle;
            }
        }

        Self {
            graph,
            policy,
            state: RunState::Idle,
            run_counter: 0,
            now: Duration::ZERO,
            seq: 0,
            scheduled: BinaryHeap::new(),
            events: Vec::new(),
        }
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    pub fn into_graph(self) -> PipelineGraph {
        self.graph
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Id of the current or most recent run.
    pub fn run_id(&self) -> Option<u64> {
        (self.run_counter > 0).then_some(self.run_counter)
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// True iff the last run finished with every node terminal.
    pub fn is_complete(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn status_of(&self, id: &str) -> Result<NodeStatus> {
        self.graph
            .node(id)
            .map(|n| n.status)
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))
    }

    /// Whether every resolved dependency of `id` has succeeded.
    pub fn deps_satisfied(&self, id: &str) -> Result<bool> {
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))?;
        Ok(deps_satisfied(&self.graph, node))
    }

    /// Counts per status, recomputed on every call.
    pub fn summary(&self) -> StatusSummary {
        StatusSummary::of(&self.graph)
    }

    /// Simulated time of the next scheduled completion.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduled.peek().map(|Reverse(s)| s.at)
    }

    /// Hand out every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<TransitionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a new run cycle.
    ///
    /// Every node that has not already succeeded becomes `Pending`, and nodes
    /// whose dependencies are all satisfied start right away. Fails with
    /// `AlreadyRunning` (changing nothing) while a run is in progress.
    pub fn start_run(&mut self) -> Result<SimStep> {
        if self.state == RunState::Running {
            warn!(run_id = self.run_counter, "start_run while a run is in progress; rejecting");
            return Err(PipelineError::AlreadyRunning(self.run_counter));
        }

        let mark = self.events.len();

        self.run_counter += 1;
        self.state = RunState::Running;
        self.scheduled.clear();
        info!(run_id = self.run_counter, nodes = self.graph.len(), "starting pipeline run");

        let mut manager = self.manager();
        let pending = manager.mark_run_pending();
        debug!(run_id = self.run_counter, ?pending, "nodes pending for this run");

        self.start_ready();
        let run_just_finished = self.maybe_finish_run();

        Ok(self.step_since(mark, run_just_finished))
    }

    /// Cancel the run in progress.
    ///
    /// Every `Pending` or `Running` node becomes `Cancelled` and the global
    /// state returns to `Idle`. Calling this with no run in progress is a
    /// no-op.
    pub fn cancel_run(&mut self) -> SimStep {
        if self.state != RunState::Running {
            debug!(state = %self.state, "cancel_run with no run in progress; nothing to do");
            return SimStep {
                run_id: self.run_id(),
                ..SimStep::default()
            };
        }

        let mark = self.events.len();

        let mut manager = self.manager();
        let cancelled = manager.cancel_transient();
        self.scheduled.clear();
        self.state = RunState::Idle;

        info!(run_id = self.run_counter, ?cancelled, "pipeline run cancelled");
        self.step_since(mark, false)
    }

    /// Return every node to `Idle` and the global state to `Idle`.
    ///
    /// A run in progress is dropped without going through `Cancelled`.
    pub fn reset(&mut self) -> SimStep {
        let mark = self.events.len();

        self.scheduled.clear();
        self.state = RunState::Idle;
        let mut manager = self.manager();
        manager.reset_all();

        info!(run_id = self.run_counter, "pipeline reset");
        self.step_since(mark, false)
    }

    /// Apply the earliest scheduled completion, moving the clock to its
    /// deadline. Returns an empty step if nothing is scheduled.
    pub fn advance(&mut self) -> SimStep {
        let mark = self.events.len();

        let Some(Reverse(done)) = self.scheduled.pop() else {
            return self.step_since(mark, false);
        };

        if done.run_id != self.run_counter || self.state != RunState::Running {
            warn!(node = %done.node, run_id = done.run_id, "stale completion; ignoring");
            return self.step_since(mark, false);
        }

        self.now = self.now.max(done.at);

        let run_id = self.run_counter;
        let mut manager = self.manager();
        match done.outcome {
            NodeOutcome::Success => {
                manager.set_status(&done.node, NodeStatus::Success);
                debug!(node = %done.node, run_id, "node completed successfully");
            }
            NodeOutcome::Failed => {
                manager.set_status(&done.node, NodeStatus::Failed);
                warn!(node = %done.node, run_id, "node failed; skipping dependents in this run");
                manager.mark_dependents_skipped(&done.node);
            }
        }

        self.start_ready();
        let run_just_finished = self.maybe_finish_run();

        self.step_since(mark, run_just_finished)
    }

    /// Apply every completion due at or before `target`, then move the
    /// clock to `target` (never backwards).
    pub fn advance_to(&mut self, target: Duration) -> Vec<TransitionEvent> {
        let mut events = Vec::new();

        while let Some(deadline) = self.next_deadline() {
            if deadline > target {
                break;
            }
            events.extend(self.advance().events);
        }

        self.now = self.now.max(target);
        events
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<TransitionEvent> {
        self.advance_to(self.now.saturating_add(delta))
    }

    /// Advance until the current run is no longer `Running`.
    pub fn run_to_completion(&mut self) -> Vec<TransitionEvent> {
        let mut events = Vec::new();

        while self.state == RunState::Running {
            if self.scheduled.is_empty() {
                // Every running node has a scheduled completion, so this
                // means the run cannot make progress.
                warn!(run_id = self.run_counter, "run has no scheduled completions; stopping");
                break;
            }
            events.extend(self.advance().events);
        }

        events
    }

    fn manager(&mut self) -> StateManager<'_> {
        StateManager::new(&mut self.graph, &mut self.events, self.run_counter, self.now)
    }

    /// Start every ready node and schedule its completion.
    fn start_ready(&mut self) {
        let run_id = self.run_counter;
        let mut manager = self.manager();
        let started = manager.collect_new_ready();

        for id in started {
            let Some(node) = self.graph.node(&id) else {
                continue;
            };

            let plan = self.policy.plan(node);
            let at = self.now.saturating_add(plan.duration);
            self.seq += 1;

            info!(
                node = %id,
                run_id,
                duration_ms = plan.duration.as_millis() as u64,
                "dependencies satisfied; node running"
            );

            self.scheduled.push(Reverse(Scheduled {
                at,
                seq: self.seq,
                run_id,
                node: id,
                outcome: plan.outcome,
            }));
        }
    }

    /// Mark the run `Completed` once no node is pending or running.
    ///
    /// Returns `true` if this call finished the run.
    fn maybe_finish_run(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }

        if self.manager().all_terminal() {
            self.state = RunState::Completed;
            info!(
                run_id = self.run_counter,
                summary = %self.summary(),
                "all nodes terminal; run completed"
            );
            true
        } else {
            false
        }
    }

    fn step_since(&self, mark: usize, run_just_finished: bool) -> SimStep {
        SimStep {
            run_id: self.run_id(),
            events: self.events[mark..].to_vec(),
            run_just_finished,
        }
    }
}
