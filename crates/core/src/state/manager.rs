//! Session manager coordinating the store and the active event source.
//!
//! The SessionManager is the central orchestrator of a pipeline run. It owns
//! the [`WorkflowStateStore`], the single active [`PipelineSource`] and the
//! channel that source writes into, and guarantees that at most one source
//! delivers events into the store at a time.

use crate::client::{ApiClient, UploadArtifact};
use crate::config::models::AppConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::simulation::SimulationSnapshot;
use crate::source::{LiveSource, PipelineSource, SimulatedSource, WorkflowSource};
use crate::state::store::{Subscription, WorkflowStateStore};
use cf_protocol::event_models::PipelineEvent;
use cf_protocol::result_models::{HealthStatus, UploadResponse};
use cf_protocol::session_models::{PipelineSession, SessionPhase};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the live session and the source feeding it.
///
/// The SessionManager provides a single interface for:
/// - Uploading a CV and following its live event stream
/// - Running the offline simulation
/// - Pausing, resuming and resetting the run
/// - Reading and subscribing to session state
pub struct SessionManager {
    config: AppConfig,
    api: ApiClient,
    store: WorkflowStateStore,

    /// Source of the current session, `None` once it has finished.
    source: Option<PipelineSource>,

    /// Receiving end of the current source's channel.
    events: Option<mpsc::UnboundedReceiver<PipelineEvent>>,
}

impl SessionManager {
    /// Create a SessionManager talking to the configured backend.
    pub fn new(config: AppConfig) -> Self {
        let api = ApiClient::new(config.api_base_url());
        Self::with_api(config, api)
    }

    pub fn with_api(config: AppConfig, api: ApiClient) -> Self {
        Self {
            config,
            api,
            store: WorkflowStateStore::new(),
            source: None,
            events: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &PipelineSession {
        self.store.session()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PipelineSession) + Send + Sync + 'static,
    {
        self.store.subscribe(handler)
    }

    /// Whether a source is still attached to the current session.
    pub fn is_active(&self) -> bool {
        self.source.as_ref().is_some_and(WorkflowSource::is_active)
    }

    /// Upload a CV and follow its event stream.
    ///
    /// The previous source is stopped first. On failure no session is
    /// created: the previous session is discarded and the idle session
    /// carries the upload error.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Upload` if the backend rejects the file or
    /// cannot be reached.
    pub async fn start_upload(&mut self, artifact: UploadArtifact) -> WorkflowResult<UploadResponse> {
        self.close_source();

        let upload = match self.api.upload_resume(artifact).await {
            Ok(upload) => upload,
            Err(error) => {
                warn!(%error, "Upload failed");
                self.store.reset();
                self.store.dispatch(PipelineEvent::error(error.to_string()));
                return Err(error);
            }
        };
        let source = PipelineSource::Live(LiveSource::new(
            self.api.event_stream(),
            upload.session_id.clone(),
        ));
        self.activate(upload.session_id.clone(), source).await?;
        Ok(upload)
    }

    /// Start the simulated pipeline under a locally generated session id.
    pub async fn start_demo(&mut self) -> WorkflowResult<String> {
        let session_id = format!("demo-{}", Uuid::new_v4());
        let source = PipelineSource::Simulated(SimulatedSource::new(
            self.config.agents.clone(),
            self.config.global.seed,
            Duration::from_millis(self.config.global.tick_interval_ms),
        ));
        self.activate(session_id.clone(), source).await?;
        Ok(session_id)
    }

    async fn activate(&mut self, session_id: String, mut source: PipelineSource) -> WorkflowResult<()> {
        self.close_source();
        info!(%session_id, source = source.kind(), "Starting session");
        self.store.begin_session(session_id);

        let (sink, events) = mpsc::unbounded_channel();
        source.start(sink).await?;
        self.source = Some(source);
        self.events = Some(events);
        Ok(())
    }

    /// Wait for the next event of the current session and fold it in.
    ///
    /// Returns `None` once the session has no source left to hear from.
    pub async fn next(&mut self) -> Option<&PipelineSession> {
        let events = self.events.as_mut()?;
        let Some(event) = events.recv().await else {
            debug!("Source channel closed");
            self.close_source();
            return None;
        };

        let phase = self.store.dispatch(event).phase();
        if phase == SessionPhase::Terminal {
            self.close_source();
        }
        Some(self.store.session())
    }

    /// Fold events until the session ends.
    pub async fn run_to_completion(&mut self) -> &PipelineSession {
        while self.next().await.is_some() {}
        self.store.session()
    }

    /// Freeze the simulation.
    ///
    /// # Errors
    ///
    /// `WorkflowError::NoActiveSession` without a source, `Unsupported` on
    /// the live stream.
    pub fn pause(&self) -> WorkflowResult<()> {
        self.source
            .as_ref()
            .ok_or(WorkflowError::NoActiveSession)?
            .pause()
    }

    pub fn resume(&self) -> WorkflowResult<()> {
        self.source
            .as_ref()
            .ok_or(WorkflowError::NoActiveSession)?
            .resume()
    }

    /// Simulation metrics of the current session, if it is simulated.
    pub fn simulation(&self) -> Option<watch::Receiver<SimulationSnapshot>> {
        self.source.as_ref().and_then(PipelineSource::simulation)
    }

    /// Stop the source and return to the idle state. Idempotent.
    pub fn reset(&mut self) {
        self.close_source();
        self.store.reset();
    }

    /// Backend health, `None` when offline.
    pub async fn check_health(&self) -> Option<HealthStatus> {
        self.api.check_health().await
    }

    fn close_source(&mut self) {
        if let Some(mut source) = self.source.take() {
            debug!(source = source.kind(), "Closing source");
            source.stop();
        }
        self.events = None;
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.close_source();
    }
}
