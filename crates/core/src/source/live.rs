//! Backend event stream as a workflow source.

use crate::client::stream::{Connection, EventStreamClient};
use crate::error::WorkflowResult;
use crate::source::{EventSink, WorkflowSource};
use async_trait::async_trait;

pub struct LiveSource {
    client: EventStreamClient,
    session_id: String,
    connection: Option<Connection>,
}

impl LiveSource {
    pub fn new(client: EventStreamClient, session_id: impl Into<String>) -> Self {
        Self {
            client,
            session_id: session_id.into(),
            connection: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[async_trait]
impl WorkflowSource for LiveSource {
    async fn start(&mut self, sink: EventSink) -> WorkflowResult<()> {
        self.stop();
        self.connection = Some(self.client.open(&self.session_id, sink));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
    }

    fn is_active(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|c| !c.state().is_final())
    }
}
