// src/config/demo.rs

//! Built-in demo pipeline: the clinical-trial analysis graph shown on the
//! repository dashboard.

use crate::config::loader::parse_str;
use crate::config::model::PipelineDefinition;
use crate::errors::Result;

pub const DEMO_PIPELINE_TOML: &str = r#"
[pipeline]
name = "Clinical trial analysis"

[simulation]
policy = "random"
seed = 42
min_duration = "2s"
max_duration = "5s"

[[node]]
id = "data-1"
name = "Patient Data"
kind = "data"
status = "success"
position = { x = 100, y = 200 }
content_hash = "a1b2c3d4"
runtime = "2.3s"

[[node]]
id = "transform-1"
name = "Data Cleaning"
kind = "transform"
status = "success"
dependencies = ["data-1"]
position = { x = 300, y = 150 }
content_hash = "e5f6g7h8"
runtime = "45.2s"

[[node]]
id = "transform-2"
name = "Feature Engineering"
kind = "transform"
dependencies = ["data-1"]
position = { x = 300, y = 250 }
content_hash = "i9j0k1l2"
runtime = "12.8s"

[[node]]
id = "model-1"
name = "ML Training"
kind = "model"
dependencies = ["transform-1", "transform-2"]
position = { x = 500, y = 200 }
content_hash = "m3n4o5p6"

[[node]]
id = "output-1"
name = "Results Export"
kind = "output"
dependencies = ["model-1"]
position = { x = 700, y = 200 }
content_hash = "q7r8s9t0"
"#;

/// Parse the built-in demo pipeline.
pub fn demo_definition() -> Result<PipelineDefinition> {
    parse_str(DEMO_PIPELINE_TOML)
}
