// src/dag/mod.rs

//! Pipeline DAG representation.
//!
//! - [`node`] holds the node data model.
//! - [`graph`] holds the ordered node collection, derives dependency edges
//!   and computes a topological order.

pub mod graph;
pub mod node;

pub use graph::{Edge, PipelineGraph};
pub use node::{Node, NodeId};
