// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod sim;
pub mod types;
pub mod view;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{PipelineDefinition, default_pipeline_path, demo_definition, load_and_validate};
use crate::engine::{EngineCommand, EngineCore, EngineEvent, EngineOptions, PipelineEngine};
use crate::errors::PipelineError;
use crate::sim::{RunSimulator, StatusSummary};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - definition loading (file or built-in demo) plus CLI overrides
/// - graph + policy + simulator
/// - the playback engine
/// - Ctrl-C handling
///
/// Returns the status summary after the run.
pub async fn run(args: CliArgs) -> Result<StatusSummary> {
    let mut definition = load_definition(&args)?;
    apply_overrides(&mut definition, &args)?;

    let graph = definition.build_graph()?;
    println!("{}", definition.name);
    print!("{}", view::render_text(&graph)?);

    if args.dry_run {
        print_dry_run(&definition);
        return Ok(StatusSummary::of(&graph));
    }

    let simulator = RunSimulator::new(graph, definition.build_policy());
    let options = EngineOptions {
        time_scale: definition.simulation.time_scale,
        exit_when_complete: true,
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>(16);
    let (event_tx, mut event_rx) = mpsc::channel::<EngineEvent>(64);

    let core = EngineCore::new(simulator, options);
    let engine = PipelineEngine::new(core, cmd_rx, event_tx);
    let handle = tokio::spawn(engine.run());

    // Ctrl-C → cancel the run and stop.
    {
        let tx = cmd_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(EngineCommand::Shutdown).await;
        });
    }

    cmd_tx.send(EngineCommand::StartRun).await?;

    while let Some(event) = event_rx.recv().await {
        match event {
            EngineEvent::Transition(t) => println!("{t}"),
            EngineEvent::RunFinished { run_id, summary } => {
                info!(run_id, %summary, "run finished");
                println!("run {run_id} completed: {summary}");
            }
            EngineEvent::RunCancelled { run_id, cancelled } => {
                println!("run {run_id} cancelled ({} nodes)", cancelled.len());
            }
            EngineEvent::CommandRejected { command, reason } => {
                warn!(?command, %reason, "engine rejected command");
            }
        }
    }

    let simulator = handle.await.context("engine task panicked")??;
    debug!(now = ?simulator.now(), "engine returned simulator");

    Ok(simulator.summary())
}

fn load_definition(args: &CliArgs) -> Result<PipelineDefinition> {
    if args.demo {
        return Ok(demo_definition()?);
    }

    let path = args
        .pipeline
        .as_ref()
        .map(Into::into)
        .unwrap_or_else(default_pipeline_path);

    load_and_validate(&path).with_context(|| format!("loading pipeline from {}", path.display()))
}

/// Apply CLI overrides to the `[simulation]` settings.
fn apply_overrides(definition: &mut PipelineDefinition, args: &CliArgs) -> Result<()> {
    let known: Vec<String> = definition.nodes().iter().map(|n| n.id.clone()).collect();
    let sim = &mut definition.simulation;

    if let Some(policy) = args.policy {
        sim.policy = policy;
    }
    if let Some(seed) = args.seed {
        sim.seed = seed;
    }
    if let Some(scale) = args.time_scale {
        if !scale.is_finite() || scale < 0.0 {
            return Err(PipelineError::ConfigError(format!(
                "--time-scale must be >= 0 (got {scale})"
            ))
            .into());
        }
        sim.time_scale = scale;
    }
    for id in &args.fail {
        if !known.contains(id) {
            return Err(PipelineError::NodeNotFound(id.clone()).into());
        }
        if !sim.fail.contains(id) {
            sim.fail.push(id.clone());
        }
    }

    Ok(())
}

/// Print the simulation settings and edges without running anything.
fn print_dry_run(definition: &PipelineDefinition) {
    let sim = &definition.simulation;
    println!();
    println!("simulation.policy = {:?}", sim.policy);
    println!("simulation.seed = {}", sim.seed);
    println!(
        "simulation.duration = {:?}..={:?}",
        sim.min_duration, sim.max_duration
    );
    println!("simulation.failure_rate = {}", sim.failure_rate);
    if !sim.fail.is_empty() {
        println!("simulation.fail = {:?}", sim.fail);
    }
    println!("simulation.time_scale = {}", sim.time_scale);

    debug!("dry-run complete (no simulation)");
}
