// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::sim::{RunSimulator, SimulationPolicy};

use super::core::{CoreStep, EngineCore};
use super::{EngineCommand, EngineEvent};

/// Plays a [`RunSimulator`] back in real time.
///
/// This is a pure IO shell around [`EngineCore`], which holds all of the
/// semantics. This struct handles async IO: reading commands from a channel,
/// sleeping until the next simulated deadline, and forwarding events.
pub struct PipelineEngine<P: SimulationPolicy> {
    core: EngineCore<P>,
    command_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl<P: SimulationPolicy> fmt::Debug for PipelineEngine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineEngine")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<P: SimulationPolicy + Send> PipelineEngine<P> {
    pub fn new(
        core: EngineCore<P>,
        command_rx: mpsc::Receiver<EngineCommand>,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            core,
            command_rx,
            event_tx,
        }
    }

    /// Main event loop.
    ///
    /// - Waits for either a command or the next simulated deadline.
    /// - Feeds it into the core.
    /// - Forwards the resulting events.
    ///
    /// Returns the simulator once the core asks to stop or the command
    /// channel closes.
    pub async fn run(mut self) -> Result<RunSimulator<P>> {
        info!("pipeline engine started");
        let mut last_sync = Instant::now();

        loop {
            let wakeup = self.core.next_wakeup();
            let timer = async move {
                match wakeup {
                    Some(d) => tokio::time::sleep(d).await,
                    None => std::future::pending::<()>().await,
                }
            };

            let step = tokio::select! {
                biased;

                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        info!("engine command channel closed; exiting");
                        break;
                    };

                    // Account for the wall-clock time spent waiting before
                    // applying the command.
                    let mut step = self.core.catch_up(last_sync.elapsed());
                    let next = self.core.handle_command(command);
                    step.events.extend(next.events);
                    step.keep_running &= next.keep_running;
                    step
                }
                _ = timer => self.core.on_deadline(),
            };
            last_sync = Instant::now();

            let keep_running = step.keep_running;
            self.forward(step).await?;

            if !keep_running {
                info!("core requested exit; stopping engine");
                break;
            }
        }

        info!("pipeline engine exiting");
        Ok(self.core.into_simulator())
    }

    async fn forward(&mut self, step: CoreStep) -> Result<()> {
        for event in step.events {
            debug!(?event, "engine emitting event");
            self.event_tx.send(event).await.map_err(Error::from)?;
        }
        Ok(())
    }
}
