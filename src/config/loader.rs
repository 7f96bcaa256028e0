// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{PipelineDefinition, RawPipelineFile};
use crate::errors::Result;

/// Load a pipeline file from a given path and return the raw
/// `RawPipelineFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (unique ids, acyclicity, etc.). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawPipelineFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a pipeline file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - duplicate node ids,
///   - dependency cycles,
///   - invalid initial statuses and simulation settings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineDefinition> {
    let raw = load_from_path(&path)?;
    PipelineDefinition::try_from(raw)
}

/// Parse and validate a pipeline definition held in memory.
pub fn parse_str(contents: &str) -> Result<PipelineDefinition> {
    let raw: RawPipelineFile = toml::from_str(contents)?;
    PipelineDefinition::try_from(raw)
}

/// `Pipeline.toml` in the current working directory.
pub fn default_pipeline_path() -> PathBuf {
    PathBuf::from("Pipeline.toml")
}
