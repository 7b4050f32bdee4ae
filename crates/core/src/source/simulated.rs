//! Local simulation as a workflow source.

use crate::error::{WorkflowError, WorkflowResult};
use crate::simulation::{SimulatedWorkflowEngine, SimulationHandle, SimulationSnapshot};
use crate::source::{EventSink, WorkflowSource};
use async_trait::async_trait;
use cf_protocol::agent_models::SimulatedAgent;
use std::time::Duration;
use tokio::sync::watch;

pub struct SimulatedSource {
    agents: Vec<SimulatedAgent>,
    seed: Option<u64>,
    period: Duration,
    handle: Option<SimulationHandle>,
}

impl SimulatedSource {
    pub fn new(agents: Vec<SimulatedAgent>, seed: Option<u64>, period: Duration) -> Self {
        Self {
            agents,
            seed,
            period,
            handle: None,
        }
    }

    fn handle(&self) -> WorkflowResult<&SimulationHandle> {
        self.handle.as_ref().ok_or(WorkflowError::NoActiveSession)
    }

    pub fn pause(&self) -> WorkflowResult<()> {
        self.handle()?.pause();
        Ok(())
    }

    pub fn resume(&self) -> WorkflowResult<()> {
        self.handle()?.resume();
        Ok(())
    }

    pub fn watch(&self) -> Option<watch::Receiver<SimulationSnapshot>> {
        self.handle.as_ref().map(SimulationHandle::watch)
    }
}

#[async_trait]
impl WorkflowSource for SimulatedSource {
    async fn start(&mut self, sink: EventSink) -> WorkflowResult<()> {
        self.stop();
        let engine = SimulatedWorkflowEngine::new(self.agents.clone(), self.seed);
        self.handle = Some(SimulationHandle::spawn(engine, self.period, sink));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
    }

    fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(SimulationHandle::is_active)
    }
}
