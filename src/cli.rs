// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::PolicyKind;

/// Command-line arguments for `pipeline-dag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipeline-dag",
    version,
    about = "Simulate a pipeline run over a dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline definition (TOML).
    ///
    /// Default: `Pipeline.toml` in the current working directory.
    #[arg(long, value_name = "PATH", conflicts_with = "demo")]
    pub pipeline: Option<String>,

    /// Use the built-in clinical-trial demo pipeline.
    #[arg(long)]
    pub demo: bool,

    /// Override the simulation policy (random, fixed, runtime-hint).
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<PolicyKind>,

    /// Override the random policy seed.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Force a node to fail. May be repeated.
    #[arg(long = "fail", value_name = "ID")]
    pub fail: Vec<String>,

    /// Wall-clock seconds per simulated second (0 = no waiting).
    #[arg(long, value_name = "F")]
    pub time_scale: Option<f64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPELINE_DAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
