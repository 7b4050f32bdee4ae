//! Producers of pipeline events.
//!
//! A session is driven by exactly one [`WorkflowSource`]: the backend's event
//! stream or the local simulation. Both push the same `PipelineEvent`
//! vocabulary into a per-session channel; nothing downstream distinguishes
//! them.

pub mod live;
pub mod simulated;

use crate::error::{WorkflowError, WorkflowResult};
use crate::simulation::SimulationSnapshot;
use async_trait::async_trait;
use cf_protocol::event_models::PipelineEvent;
use tokio::sync::{mpsc, watch};

pub use live::LiveSource;
pub use simulated::SimulatedSource;

/// Channel end a source writes its events into.
pub type EventSink = mpsc::UnboundedSender<PipelineEvent>;

/// Common capability of every event producer.
#[async_trait]
pub trait WorkflowSource: Send {
    /// Begin producing events into `sink`.
    async fn start(&mut self, sink: EventSink) -> WorkflowResult<()>;

    /// Stop producing events. Idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// The source driving the current session.
pub enum PipelineSource {
    Live(LiveSource),
    Simulated(SimulatedSource),
}

impl PipelineSource {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineSource::Live(_) => "live",
            PipelineSource::Simulated(_) => "simulated",
        }
    }

    /// Freeze the simulation timer.
    ///
    /// # Errors
    ///
    /// `WorkflowError::Unsupported` for the live stream.
    pub fn pause(&self) -> WorkflowResult<()> {
        match self {
            PipelineSource::Simulated(source) => source.pause(),
            PipelineSource::Live(_) => Err(WorkflowError::Unsupported {
                operation: "pause",
                source_kind: self.kind(),
            }),
        }
    }

    pub fn resume(&self) -> WorkflowResult<()> {
        match self {
            PipelineSource::Simulated(source) => source.resume(),
            PipelineSource::Live(_) => Err(WorkflowError::Unsupported {
                operation: "resume",
                source_kind: self.kind(),
            }),
        }
    }

    /// Simulation metrics, if this is the simulated source.
    pub fn simulation(&self) -> Option<watch::Receiver<SimulationSnapshot>> {
        match self {
            PipelineSource::Simulated(source) => source.watch(),
            PipelineSource::Live(_) => None,
        }
    }
}

#[async_trait]
impl WorkflowSource for PipelineSource {
    async fn start(&mut self, sink: EventSink) -> WorkflowResult<()> {
        match self {
            PipelineSource::Live(source) => source.start(sink).await,
            PipelineSource::Simulated(source) => source.start(sink).await,
        }
    }

    fn stop(&mut self) {
        match self {
            PipelineSource::Live(source) => source.stop(),
            PipelineSource::Simulated(source) => source.stop(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            PipelineSource::Live(source) => source.is_active(),
            PipelineSource::Simulated(source) => source.is_active(),
        }
    }
}
