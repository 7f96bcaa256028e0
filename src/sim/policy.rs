// src/sim/policy.rs

//! Pluggable policies that decide how long a node runs and how it ends.
//!
//! The simulator asks its policy for a [`NodePlan`] every time a node moves
//! to `Running`. Tests should use [`FixedPolicy`]; the CLI defaults to
//! [`RandomPolicy`] with a fixed seed.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dag::{Node, NodeId};

/// How a simulated node ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeOutcome {
    Success,
    Failed,
}

/// Simulated duration and outcome for one node execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePlan {
    pub duration: Duration,
    pub outcome: NodeOutcome,
}

impl NodePlan {
    pub fn success(duration: Duration) -> Self {
        Self {
            duration,
            outcome: NodeOutcome::Success,
        }
    }

    pub fn failure(duration: Duration) -> Self {
        Self {
            duration,
            outcome: NodeOutcome::Failed,
        }
    }
}

/// Strategy that plans each node execution.
pub trait SimulationPolicy {
    fn plan(&mut self, node: &Node) -> NodePlan;
}

impl<P: SimulationPolicy + ?Sized> SimulationPolicy for Box<P> {
    fn plan(&mut self, node: &Node) -> NodePlan {
        (**self).plan(node)
    }
}

/// Deterministic policy: every node takes `duration` (unless overridden)
/// and succeeds unless listed as failing.
#[derive(Debug, Clone)]
pub struct FixedPolicy {
    duration: Duration,
    durations: HashMap<NodeId, Duration>,
    failing: HashSet<NodeId>,
}

impl FixedPolicy {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            durations: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    pub fn with_duration(mut self, node: impl Into<NodeId>, duration: Duration) -> Self {
        self.durations.insert(node.into(), duration);
        self
    }

    pub fn failing(mut self, node: impl Into<NodeId>) -> Self {
        self.failing.insert(node.into());
        self
    }
}

impl Default for FixedPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl SimulationPolicy for FixedPolicy {
    fn plan(&mut self, node: &Node) -> NodePlan {
        let duration = self
            .durations
            .get(&node.id)
            .copied()
            .unwrap_or(self.duration);

        if self.failing.contains(&node.id) {
            NodePlan::failure(duration)
        } else {
            NodePlan::success(duration)
        }
    }
}

/// Seeded random policy.
///
/// Durations are uniform in `[min, max]`; each node fails with probability
/// `failure_rate`, or always if it is listed as failing.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
    min: Duration,
    max: Duration,
    failure_rate: f64,
    failing: HashSet<NodeId>,
}

impl RandomPolicy {
    pub const DEFAULT_MIN: Duration = Duration::from_millis(2000);
    pub const DEFAULT_MAX: Duration = Duration::from_millis(5000);

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
            failure_rate: 0.0,
            failing: HashSet::new(),
        }
    }

    pub fn with_range(mut self, min: Duration, max: Duration) -> Self {
        self.min = min.min(max);
        self.max = max.max(min);
        self
    }

    /// Clamped to `0.0..=1.0`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    pub fn failing(mut self, node: impl Into<NodeId>) -> Self {
        self.failing.insert(node.into());
        self
    }
}

impl SimulationPolicy for RandomPolicy {
    fn plan(&mut self, node: &Node) -> NodePlan {
        let min_ms = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        let duration = Duration::from_millis(self.rng.gen_range(min_ms..=max_ms));

        let fails = self.failing.contains(&node.id)
            || (self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate));

        if fails {
            NodePlan::failure(duration)
        } else {
            NodePlan::success(duration)
        }
    }
}

/// Uses each node's recorded `runtime` (e.g. `"45.2s"`) as its duration.
///
/// Nodes without a parseable runtime take `fallback`.
#[derive(Debug, Clone)]
pub struct RuntimeHintPolicy {
    fallback: Duration,
    failing: HashSet<NodeId>,
}

impl RuntimeHintPolicy {
    pub fn new(fallback: Duration) -> Self {
        Self {
            fallback,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, node: impl Into<NodeId>) -> Self {
        self.failing.insert(node.into());
        self
    }
}

impl SimulationPolicy for RuntimeHintPolicy {
    fn plan(&mut self, node: &Node) -> NodePlan {
        let duration = node
            .runtime
            .as_deref()
            .and_then(|s| parse_duration(s).ok())
            .unwrap_or(self.fallback);

        if self.failing.contains(&node.id) {
            NodePlan::failure(duration)
        } else {
            NodePlan::success(duration)
        }
    }
}

/// Parse a duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"` or
/// `"45.2s"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between the number and the suffix.
    let idx = s
        .chars()
        .position(|c| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: f64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = match unit.as_str() {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 60.0 * 60.0,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{}': {}", s, e))
}
