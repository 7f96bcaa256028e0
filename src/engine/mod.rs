// src/engine/mod.rs

//! Real-time playback engine for the run simulator.
//!
//! This module ties together:
//! - the synchronous [`RunSimulator`](crate::sim::RunSimulator)
//! - commands from the outside world (start, cancel, reset, shutdown)
//! - wall-clock timers that advance simulated time
//! - an outgoing stream of [`EngineEvent`]s for whatever renders the run
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::dag::NodeId;
use crate::sim::{StatusSummary, TransitionEvent};

/// Commands accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    StartRun,
    CancelRun,
    Reset,
    /// Cancel any run in progress and stop the engine.
    Shutdown,
}

/// Events flowing out of the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A node changed status.
    Transition(TransitionEvent),
    /// Every node of the run is terminal.
    RunFinished {
        run_id: u64,
        summary: StatusSummary,
    },
    /// The run was cancelled before it finished.
    RunCancelled {
        run_id: u64,
        cancelled: Vec<NodeId>,
    },
    /// A command could not be applied; the engine state is unchanged.
    CommandRejected {
        command: EngineCommand,
        reason: String,
    },
}

/// Options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Wall-clock seconds per simulated second. `0.0` plays back as fast as
    /// possible.
    pub time_scale: f64,
    /// Stop the engine once a run completes (used by the CLI).
    pub exit_when_complete: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            exit_when_complete: false,
        }
    }
}

pub mod core;
pub mod runtime;

pub use core::{CoreStep, EngineCore};
pub use runtime::PipelineEngine;
