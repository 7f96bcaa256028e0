// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::config::model::{
    NodeConfig, PipelineDefinition, RawPipelineFile, SimulationSection, SimulationSettings,
};
use crate::errors::{PipelineError, Result};
use crate::sim::parse_duration;
use crate::types::NodeStatus;

impl TryFrom<RawPipelineFile> for PipelineDefinition {
    type Error = PipelineError;

    fn try_from(raw: RawPipelineFile) -> std::result::Result<Self, Self::Error> {
        validate_raw(&raw)?;
        let simulation = simulation_settings(&raw.simulation)?;
        let name = raw
            .pipeline
            .name
            .unwrap_or_else(|| "pipeline".to_string());
        Ok(PipelineDefinition::new_unchecked(name, simulation, raw.nodes))
    }
}

/// Run every semantic check on a raw definition.
pub fn validate_raw(cfg: &RawPipelineFile) -> Result<()> {
    ensure_has_nodes(cfg)?;
    validate_nodes(cfg)?;
    validate_unique_ids(cfg)?;
    simulation_settings(&cfg.simulation)?;
    validate_fail_list(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_nodes(cfg: &RawPipelineFile) -> Result<()> {
    if cfg.nodes.is_empty() {
        return Err(PipelineError::ConfigError(
            "pipeline must contain at least one [[node]] table".to_string(),
        ));
    }
    Ok(())
}

fn validate_nodes(cfg: &RawPipelineFile) -> Result<()> {
    for node in &cfg.nodes {
        if node.id.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "node id must not be empty".to_string(),
            ));
        }

        if let Some(status) = node.status {
            if !matches!(
                status,
                NodeStatus::Idle | NodeStatus::Success | NodeStatus::Failed
            ) {
                return Err(PipelineError::ConfigError(format!(
                    "node '{}' has initial status '{}'; expected idle, success or failed",
                    node.id, status
                )));
            }
        }

        if let Some(ref runtime) = node.runtime {
            if parse_duration(runtime).is_err() {
                // Runtime is display-only; only the runtime-hint policy reads it.
                debug!(node = %node.id, %runtime, "runtime is not a parseable duration");
            }
        }
    }
    Ok(())
}

fn validate_unique_ids(cfg: &RawPipelineFile) -> Result<()> {
    let mut seen = HashSet::new();
    for node in &cfg.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(PipelineError::DuplicateId(node.id.clone()));
        }
    }
    Ok(())
}

pub(crate) fn simulation_settings(sim: &SimulationSection) -> Result<SimulationSettings> {
    let min_duration = parse_duration(&sim.min_duration).map_err(|e| {
        PipelineError::ConfigError(format!("[simulation].min_duration: {e}"))
    })?;
    let max_duration = parse_duration(&sim.max_duration).map_err(|e| {
        PipelineError::ConfigError(format!("[simulation].max_duration: {e}"))
    })?;

    if min_duration > max_duration {
        return Err(PipelineError::ConfigError(format!(
            "[simulation].min_duration ({}) must not exceed max_duration ({})",
            sim.min_duration, sim.max_duration
        )));
    }

    if !(0.0..=1.0).contains(&sim.failure_rate) {
        return Err(PipelineError::ConfigError(format!(
            "[simulation].failure_rate must be within 0.0..=1.0 (got {})",
            sim.failure_rate
        )));
    }

    if !sim.time_scale.is_finite() || sim.time_scale < 0.0 {
        return Err(PipelineError::ConfigError(format!(
            "[simulation].time_scale must be >= 0 (got {})",
            sim.time_scale
        )));
    }

    Ok(SimulationSettings {
        policy: sim.policy,
        seed: sim.seed,
        min_duration,
        max_duration,
        failure_rate: sim.failure_rate,
        fail: sim.fail.clone(),
        time_scale: sim.time_scale,
    })
}

fn validate_fail_list(cfg: &RawPipelineFile) -> Result<()> {
    for id in &cfg.simulation.fail {
        if !cfg.nodes.iter().any(|n| &n.id == id) {
            return Err(PipelineError::ConfigError(format!(
                "[simulation].fail names unknown node '{}'",
                id
            )));
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawPipelineFile) -> Result<()> {
    // Edge direction: dependency -> node.
    //
    // For:
    //   [[node]]
    //   id = "B"
    //   dependencies = ["A"]
    // we add edge A -> B. Dependencies on undeclared ids produce no edge.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    let declared: HashSet<&str> = cfg.nodes.iter().map(|n| n.id.as_str()).collect();

    for node in &cfg.nodes {
        graph.add_node(node.id.as_str());
    }

    for node in &cfg.nodes {
        for dep in resolved_dependencies(node, &declared) {
            graph.add_edge(dep, node.id.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(PipelineError::CycleDetected(format!(
            "cycle detected in pipeline involving node '{}'",
            cycle.node_id()
        ))),
    }
}

fn resolved_dependencies<'a>(
    node: &'a NodeConfig,
    declared: &HashSet<&str>,
) -> Vec<&'a str> {
    let node_id = node.id.as_str();
    let mut dropped = Vec::new();
    let mut kept = Vec::new();

    for dep in &node.dependencies {
        if declared.contains(dep.as_str()) {
            kept.push(dep.as_str());
        } else {
            dropped.push(dep.as_str());
        }
    }

    if !dropped.is_empty() {
        debug!(node = %node_id, ?dropped, "ignoring dependencies on undeclared nodes");
    }

    kept
}
