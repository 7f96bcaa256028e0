// src/sim/mod.rs

//! Run simulation over a pipeline graph.
//!
//! - [`simulator`] contains the per-run state machine ([`RunSimulator`]).
//! - [`state_manager`] applies individual status transitions.
//! - [`policy`] provides the pluggable duration/outcome policies.
//! - [`event`] defines transition events and step results.
//! - [`summary`] counts nodes per status.
//!
//! Nothing here touches the wall clock; see [`crate::engine`] for the async
//! shell that plays a simulation back in real time.

pub mod event;
pub mod policy;
pub mod simulator;
pub mod state_manager;
pub mod summary;

pub use event::{SimStep, TransitionEvent};
pub use policy::{
    FixedPolicy, NodeOutcome, NodePlan, RandomPolicy, RuntimeHintPolicy, SimulationPolicy,
    parse_duration,
};
pub use simulator::RunSimulator;
pub use summary::StatusSummary;
