//! Pipeline event vocabulary.
//!
//! These are the five typed messages a pipeline run produces, whether they
//! arrive over the server-sent event stream or are manufactured by the local
//! simulation. On the wire each message is an SSE frame whose `event:` field is
//! the snake_case variant name and whose `data:` field is the JSON payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::result_models::PipelineResult;
use crate::session_models::StepStatus;

/// Event names recognized on the stream, in protocol order.
pub const EVENT_NAMES: [&str; 5] = [
    "pipeline_start",
    "step_start",
    "step_complete",
    "pipeline_complete",
    "pipeline_error",
];

/// A step as announced by `pipeline_start`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StepDescriptor {
    pub name: String,
    #[serde(default = "StepStatus::initial")]
    pub status: StepStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct PipelineStartPayload {
    pub total_steps: usize,
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StepStartPayload {
    pub step_index: usize,
    #[serde(default)]
    pub step_name: String,
    #[serde(default)]
    pub description: String,
}

/// Final status reported for a step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Completed,
    Error,
}

impl From<StepOutcome> for StepStatus {
    fn from(outcome: StepOutcome) -> Self {
        match outcome {
            StepOutcome::Completed => StepStatus::Completed,
            StepOutcome::Error => StepStatus::Error,
        }
    }
}

/// Structured agent log attached to a completed step.
///
/// Field names follow the wire format, including the camelCase `nextAction`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct StepLog {
    pub agent: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Percentage as sent by the server; may be fractional or out of range.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub next_action: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StepCompletePayload {
    pub step_index: usize,
    #[serde(default)]
    pub step_name: String,
    pub status: StepOutcome,
    /// Step-specific details; shape varies per step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<StepLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct PipelineErrorPayload {
    pub error: String,
}

/// A single message of the pipeline event stream.
///
/// Serialized as an adjacently tagged enum so a session's event history can be
/// stored or forwarded as plain JSON:
/// ```json
/// { "event": "step_start", "data": { "step_index": 0, "step_name": "Resume Parser", "description": "" } }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    PipelineStart(PipelineStartPayload),
    StepStart(StepStartPayload),
    StepComplete(StepCompletePayload),
    PipelineComplete(PipelineResult),
    PipelineError(PipelineErrorPayload),
}

/// Errors raised while turning a raw stream frame into a [`PipelineEvent`].
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("unknown event type '{0}'")]
    UnknownEvent(String),

    #[error("invalid '{event}' payload: {source}")]
    InvalidPayload {
        event: String,
        source: serde_json::Error,
    },
}

impl PipelineEvent {
    /// Parse a frame given its event name and JSON data.
    pub fn parse(event: &str, data: &str) -> Result<Self, ProtocolError> {
        if !EVENT_NAMES.contains(&event) {
            return Err(ProtocolError::UnknownEvent(event.to_string()));
        }

        let payload: serde_json::Value =
            serde_json::from_str(data).map_err(|source| ProtocolError::InvalidPayload {
                event: event.to_string(),
                source,
            })?;

        serde_json::from_value(serde_json::json!({ "event": event, "data": payload })).map_err(
            |source| ProtocolError::InvalidPayload {
                event: event.to_string(),
                source,
            },
        )
    }

    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::PipelineStart(_) => "pipeline_start",
            PipelineEvent::StepStart(_) => "step_start",
            PipelineEvent::StepComplete(_) => "step_complete",
            PipelineEvent::PipelineComplete(_) => "pipeline_complete",
            PipelineEvent::PipelineError(_) => "pipeline_error",
        }
    }

    /// Whether this event ends a session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineEvent::PipelineComplete(_) | PipelineEvent::PipelineError(_)
        )
    }

    /// Shorthand for a `pipeline_error` event.
    pub fn error(message: impl Into<String>) -> Self {
        PipelineEvent::PipelineError(PipelineErrorPayload {
            error: message.into(),
        })
    }

    /// Encode as a complete SSE frame (`event:` + `data:` + blank line).
    pub fn to_sse_frame(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        let data = value
            .get("data")
            .map(serde_json::Value::to_string)
            .unwrap_or_else(|| "{}".to_string());
        Ok(format!("event: {}\ndata: {}\n\n", self.name(), data))
    }
}
