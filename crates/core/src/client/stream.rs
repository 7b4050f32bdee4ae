//! One-shot event stream connection for a pipeline session.
//!
//! A connection runs in its own task. It decodes SSE frames into
//! [`PipelineEvent`]s, hands them to a [`PipelineHandlers`] implementation in
//! arrival order and closes itself after the first terminal event. A transport
//! that dies early produces a synthetic `pipeline_error` carrying
//! [`CONNECTION_LOST`](crate::error::CONNECTION_LOST).

use crate::client::sse::frames;
use crate::error::WorkflowError;
use cf_protocol::event_models::{
    PipelineErrorPayload, PipelineEvent, PipelineStartPayload, ProtocolError,
    StepCompletePayload, StepStartPayload,
};
use cf_protocol::result_models::PipelineResult;
use reqwest::header::ACCEPT;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

/// Receives the events of one connection.
///
/// Every method defaults to a no-op; `on_event` routes to the per-kind
/// methods unless overridden.
pub trait PipelineHandlers: Send + 'static {
    fn on_pipeline_start(&mut self, _payload: &PipelineStartPayload) {}
    fn on_step_start(&mut self, _payload: &StepStartPayload) {}
    fn on_step_complete(&mut self, _payload: &StepCompletePayload) {}
    fn on_pipeline_complete(&mut self, _result: &PipelineResult) {}
    fn on_pipeline_error(&mut self, _payload: &PipelineErrorPayload) {}

    fn on_event(&mut self, event: PipelineEvent) {
        match &event {
            PipelineEvent::PipelineStart(p) => self.on_pipeline_start(p),
            PipelineEvent::StepStart(p) => self.on_step_start(p),
            PipelineEvent::StepComplete(p) => self.on_step_complete(p),
            PipelineEvent::PipelineComplete(r) => self.on_pipeline_complete(r),
            PipelineEvent::PipelineError(p) => self.on_pipeline_error(p),
        }
    }
}

/// Forwards every event into a session channel.
impl PipelineHandlers for mpsc::UnboundedSender<PipelineEvent> {
    fn on_event(&mut self, event: PipelineEvent) {
        let _ = self.send(event);
    }
}

/// Lifecycle of a connection. `Complete`, `Errored` and `Closed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Streaming,
    Complete,
    Errored,
    /// Closed by the caller before a terminal event.
    Closed,
}

impl ConnectionState {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            ConnectionState::Complete | ConnectionState::Errored | ConnectionState::Closed
        )
    }
}

#[derive(Clone)]
struct SharedState(Arc<Mutex<ConnectionState>>);

impl SharedState {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(ConnectionState::Idle)))
    }

    fn get(&self) -> ConnectionState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `next` unless already final. Returns whether it moved.
    fn transition(&self, next: ConnectionState) -> bool {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_final() {
            return false;
        }
        if *state != next {
            debug!(from = ?*state, to = ?next, "Connection state");
            *state = next;
        }
        true
    }
}

/// Handle to a running connection. Dropping it closes the connection.
pub struct Connection {
    state: SharedState,
    task: Option<JoinHandle<()>>,
}

impl Connection {
    /// Run a connection over an arbitrary SSE byte stream.
    pub fn spawn<S, B, E, H>(body: S, handlers: H) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Display + Send + 'static,
        H: PipelineHandlers,
    {
        let state = SharedState::new();
        let task = tokio::spawn(pump(body, state.clone(), handlers));
        Self {
            state,
            task: Some(task),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Stop delivering events. Idempotent; a no-op once final.
    pub fn close(&mut self) {
        if self.state.transition(ConnectionState::Closed) {
            info!("Event stream closed");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Wait until the connection task has ended.
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
            self.task = None;
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

async fn pump<S, B, E, H>(body: S, state: SharedState, mut handlers: H)
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    H: PipelineHandlers,
{
    state.transition(ConnectionState::Connecting);
    let mut frames = frames(body);

    while let Some(item) = frames.next().await {
        let frame = match item {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, "Event stream transport error");
                break;
            }
        };

        if !state.transition(ConnectionState::Streaming) {
            return;
        }

        match PipelineEvent::parse(&frame.event, &frame.data) {
            Ok(event) => {
                let terminal = match &event {
                    PipelineEvent::PipelineComplete(_) => Some(ConnectionState::Complete),
                    PipelineEvent::PipelineError(_) => Some(ConnectionState::Errored),
                    _ => None,
                };
                debug!(event = event.name(), "Event received");
                handlers.on_event(event);

                if let Some(terminal) = terminal {
                    state.transition(terminal);
                    info!(state = ?terminal, "Event stream finished");
                    return;
                }
            }
            Err(ProtocolError::UnknownEvent(name)) => {
                debug!(event = %name, "Skipping unknown event");
            }
            Err(error) => {
                warn!(%error, "Skipping malformed event");
            }
        }
    }

    if state.transition(ConnectionState::Errored) {
        warn!("Event stream ended before a terminal event");
        handlers.on_event(PipelineEvent::error(WorkflowError::StreamConnection.to_string()));
    }
}

/// Opens event stream connections against the pipeline backend.
#[derive(Clone)]
pub struct EventStreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl EventStreamClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn stream_url(&self, session_id: &str) -> String {
        format!("{}/api/pipeline/{}", self.base_url, session_id)
    }

    /// Connect to the stream of `session_id`.
    ///
    /// A failed request or a non-success status surfaces through `handlers`
    /// as `pipeline_error("Connection lost")`.
    pub fn open<H: PipelineHandlers>(&self, session_id: &str, handlers: H) -> Connection {
        let url = self.stream_url(session_id);
        info!(%url, "Opening event stream");
        let request = self.http.get(url).header(ACCEPT, "text/event-stream");

        let body = async_stream::stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e.to_string());
                    return;
                }
            };
            if !response.status().is_success() {
                yield Err(format!("HTTP {}", response.status()));
                return;
            }

            let mut chunks = response.bytes_stream();
            while let Some(chunk) = chunks.next().await {
                yield chunk.map_err(|e| e.to_string());
            }
        };

        Connection::spawn(body, handlers)
    }
}
