// src/config/mod.rs

//! Pipeline definition loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a definition from disk or memory (`loader.rs`).
//! - Validate unique ids, acyclicity and simulation settings (`validate.rs`).
//! - Ship the built-in demo pipeline (`demo.rs`).

pub mod demo;
pub mod loader;
pub mod model;
pub mod validate;

pub use demo::demo_definition;
pub use loader::{default_pipeline_path, load_and_validate, load_from_path, parse_str};
pub use model::{
    NodeConfig, PipelineDefinition, PipelineSection, PolicyKind, RawPipelineFile,
    SimulationSection, SimulationSettings,
};
pub use validate::validate_raw;
