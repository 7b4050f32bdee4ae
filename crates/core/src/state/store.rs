//! Owning store for the active pipeline session.
//!
//! All mutation flows through [`reduce`]; subscribers only ever receive
//! snapshots.

use crate::state::reducer::reduce;
use cf_protocol::event_models::PipelineEvent;
use cf_protocol::session_models::{PipelineSession, SessionPhase};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::info;

type Handler = Arc<dyn Fn(&PipelineSession) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Holds the single live `PipelineSession` and notifies subscribers on change.
#[derive(Default)]
pub struct WorkflowStateStore {
    session: PipelineSession,
    registry: Arc<Mutex<Registry>>,
}

/// Keeps a handler registered until dropped or unsubscribed.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl WorkflowStateStore {
    /// A store holding the idle placeholder session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &PipelineSession {
        &self.session
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> PipelineSession {
        self.session.clone()
    }

    /// Register a handler called with every new state.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PipelineSession) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, Arc::new(handler)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Replace the current session with a fresh one for `session_id`.
    ///
    /// Returns the discarded session.
    pub fn begin_session(&mut self, session_id: impl Into<String>) -> PipelineSession {
        let next = PipelineSession::new(session_id);
        let previous = std::mem::replace(&mut self.session, next);
        if let Some(id) = &previous.session_id {
            info!(
                session_id = %id,
                from = ?previous.phase(),
                to = ?SessionPhase::Discarded,
                "Discarding previous session"
            );
        }
        self.publish();
        previous
    }

    /// Fold an event stamped with the current time.
    pub fn dispatch(&mut self, event: PipelineEvent) -> &PipelineSession {
        self.dispatch_at(event, Utc::now())
    }

    /// Fold an event received at `received_at`.
    pub fn dispatch_at(
        &mut self,
        event: PipelineEvent,
        received_at: DateTime<Utc>,
    ) -> &PipelineSession {
        let current = std::mem::take(&mut self.session);
        self.session = reduce(current, event, received_at);
        self.publish();
        &self.session
    }

    /// Back to the idle placeholder. Calling it twice equals calling it once.
    pub fn reset(&mut self) {
        self.session = PipelineSession::default();
        self.publish();
    }

    fn publish(&self) {
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        for handler in handlers {
            handler(&self.session);
        }
    }
}
