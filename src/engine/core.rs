// src/engine/core.rs

//! Pure core of the playback engine.
//!
//! [`EngineCore`] consumes [`EngineCommand`]s and deadline ticks and produces:
//! - an updated simulator state
//! - a list of [`EngineEvent`]s for the IO shell to forward
//!
//! It has no channels, no Tokio types, and performs no IO, so it can be
//! unit tested by calling it directly.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::engine::{EngineCommand, EngineEvent, EngineOptions};
use crate::sim::{RunSimulator, SimStep, SimulationPolicy};

/// Decision returned by the core after handling a command or tick.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Events the IO shell should forward, in order.
    pub events: Vec<EngineEvent>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn keep(events: Vec<EngineEvent>) -> Self {
        Self {
            events,
            keep_running: true,
        }
    }
}

pub struct EngineCore<P: SimulationPolicy> {
    sim: RunSimulator<P>,
    options: EngineOptions,
}

impl<P: SimulationPolicy> fmt::Debug for EngineCore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCore")
            .field("run_state", &self.sim.run_state())
            .field("now", &self.sim.now())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<P: SimulationPolicy> EngineCore<P> {
    pub fn new(sim: RunSimulator<P>, options: EngineOptions) -> Self {
        Self { sim, options }
    }

    pub fn simulator(&self) -> &RunSimulator<P> {
        &self.sim
    }

    pub fn into_simulator(self) -> RunSimulator<P> {
        self.sim
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Wall-clock time until the next scheduled completion.
    pub fn next_wakeup(&self) -> Option<Duration> {
        let deadline = self.sim.next_deadline()?;
        let remaining = deadline.saturating_sub(self.sim.now());
        Some(scale_duration(remaining, self.options.time_scale))
    }

    /// Handle a single command.
    pub fn handle_command(&mut self, command: EngineCommand) -> CoreStep {
        debug!(?command, "engine core handling command");

        match command {
            EngineCommand::StartRun => match self.sim.start_run() {
                Ok(step) => self.finish_step(step),
                Err(err) => {
                    warn!(error = %err, "start rejected");
                    CoreStep::keep(vec![EngineEvent::CommandRejected {
                        command,
                        reason: err.to_string(),
                    }])
                }
            },
            EngineCommand::CancelRun => {
                let step = self.sim.cancel_run();
                CoreStep::keep(cancel_events(step))
            }
            EngineCommand::Reset => {
                let step = self.sim.reset();
                CoreStep::keep(transitions(step.events))
            }
            EngineCommand::Shutdown => {
                let step = self.sim.cancel_run();
                CoreStep {
                    events: cancel_events(step),
                    keep_running: false,
                }
            }
        }
    }

    /// The next deadline was reached: apply the earliest completion.
    pub fn on_deadline(&mut self) -> CoreStep {
        let step = self.sim.advance();
        self.finish_step(step)
    }

    /// Move simulated time forward by `elapsed` wall-clock time, applying any
    /// completions that fall inside it.
    pub fn catch_up(&mut self, elapsed: Duration) -> CoreStep {
        if self.options.time_scale <= 0.0 || !self.sim.is_running() {
            return CoreStep::keep(Vec::new());
        }

        let simulated = scale_duration(elapsed, self.options.time_scale.recip());
        let target = self.sim.now().saturating_add(simulated);

        let mut events = Vec::new();
        let mut keep_running = true;

        while let Some(deadline) = self.sim.next_deadline() {
            if deadline > target {
                break;
            }
            let step = self.on_deadline();
            keep_running &= step.keep_running;
            events.extend(step.events);
        }
        self.sim.advance_to(target);

        CoreStep {
            events,
            keep_running,
        }
    }

    fn finish_step(&self, step: SimStep) -> CoreStep {
        let run_just_finished = step.run_just_finished;
        let run_id = step.run_id.unwrap_or(0);
        let mut events = transitions(step.events);

        let mut keep_running = true;
        if run_just_finished {
            events.push(EngineEvent::RunFinished {
                run_id,
                summary: self.sim.summary(),
            });
            if self.options.exit_when_complete {
                keep_running = false;
            }
        }

        CoreStep {
            events,
            keep_running,
        }
    }
}

/// `d * factor`, saturating at `Duration::MAX` when the product does not fit.
fn scale_duration(d: Duration, factor: f64) -> Duration {
    if d.is_zero() {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(d.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

fn transitions(events: Vec<crate::sim::TransitionEvent>) -> Vec<EngineEvent> {
    events.into_iter().map(EngineEvent::Transition).collect()
}

fn cancel_events(step: SimStep) -> Vec<EngineEvent> {
    if step.events.is_empty() {
        return Vec::new();
    }

    let run_id = step.run_id.unwrap_or(0);
    let cancelled = step.cancelled().into_iter().map(str::to_string).collect();
    let mut events = transitions(step.events);
    events.push(EngineEvent::RunCancelled { run_id, cancelled });
    events
}
