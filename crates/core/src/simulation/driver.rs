//! Timer driver for the simulated pipeline.
//!
//! Runs a [`SimulatedWorkflowEngine`] on a tokio interval in a background task,
//! forwards its events into the session channel and publishes metrics through a
//! `watch` channel.

use crate::simulation::engine::{SimulatedWorkflowEngine, SimulationSnapshot};
use cf_protocol::event_models::PipelineEvent;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Controls accepted by a running simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationCommand {
    Pause,
    Resume,
    /// Back to the initial state; the timer stops.
    Reset,
    Stop,
}

/// Handle to a simulation running in the background.
///
/// Dropping the handle stops the timer.
pub struct SimulationHandle {
    commands: mpsc::UnboundedSender<SimulationCommand>,
    snapshots: watch::Receiver<SimulationSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SimulationHandle {
    /// Start `engine` and tick it every `period`.
    ///
    /// The start events are sent before this returns; the first tick fires one
    /// period later.
    pub fn spawn(
        mut engine: SimulatedWorkflowEngine,
        period: Duration,
        sink: mpsc::UnboundedSender<PipelineEvent>,
    ) -> Self {
        for event in engine.start() {
            let _ = sink.send(event);
        }

        let (snapshot_tx, snapshots) = watch::channel(engine.snapshot());
        let (commands, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(engine, period, sink, command_rx, snapshot_tx));

        Self {
            commands,
            snapshots,
            task: Some(task),
        }
    }

    pub fn pause(&self) {
        self.send(SimulationCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(SimulationCommand::Resume);
    }

    pub fn reset(&self) {
        self.send(SimulationCommand::Reset);
    }

    /// Stop the timer. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            self.send(SimulationCommand::Stop);
            task.abort();
        }
    }

    /// Whether the timer task is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Latest published metrics.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn watch(&self) -> watch::Receiver<SimulationSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, command: SimulationCommand) {
        // The task may already have finished; nothing left to control then.
        let _ = self.commands.send(command);
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    mut engine: SimulatedWorkflowEngine,
    period: Duration,
    sink: mpsc::UnboundedSender<PipelineEvent>,
    mut commands: mpsc::UnboundedReceiver<SimulationCommand>,
    snapshots: watch::Sender<SimulationSnapshot>,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let command = command.unwrap_or(SimulationCommand::Stop);
                debug!(?command, "Simulation command");
                match command {
                    SimulationCommand::Pause => {
                        engine.pause();
                    }
                    SimulationCommand::Resume => {
                        engine.resume();
                    }
                    SimulationCommand::Reset => {
                        engine.reset();
                        let _ = snapshots.send(engine.snapshot());
                        break;
                    }
                    SimulationCommand::Stop => break,
                }
                let _ = snapshots.send(engine.snapshot());
            }
            _ = interval.tick() => {
                let events = engine.tick();
                let produced = !events.is_empty();
                for event in events {
                    if sink.send(event).is_err() {
                        debug!("Session channel closed, stopping simulation");
                        return;
                    }
                }
                if produced || !engine.is_paused() {
                    let _ = snapshots.send(engine.snapshot());
                }
                if engine.is_finished() {
                    debug!("Simulation finished");
                    break;
                }
            }
        }
    }
}
