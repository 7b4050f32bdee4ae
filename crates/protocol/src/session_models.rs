//! Workflow session state models.
//!
//! This module defines the single `PipelineSession` value the core folds
//! events into, together with its steps and structured log entries. External
//! renderers only ever see snapshots of these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::event_models::StepLog;
use crate::result_models::PipelineResult;

/// Highest confidence value a log entry can carry.
pub const MAX_CONFIDENCE: u8 = 100;

/// Lifecycle status of one pipeline step.
///
/// Normal progression is Waiting -> Running -> Completed. A step the server
/// reports as failed ends in Error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Waiting,
    Running,
    Completed,
    Error,
}

impl StepStatus {
    /// Status every step starts in.
    pub fn initial() -> Self {
        StepStatus::Waiting
    }

    /// Display label used by the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Waiting => "Queued",
            StepStatus::Running => "Running",
            StepStatus::Completed => "Done",
            StepStatus::Error => "Error",
        }
    }
}

/// A structured record of one agent's reasoning for one completed step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub agent: String,
    pub task: String,
    pub reasoning: String,
    /// Tools the agent used, first-seen order, no duplicates.
    pub tools: Vec<String>,
    /// 0..=100.
    pub confidence: u8,
    pub next_action: String,
    /// Verbatim `time` field of the payload (the server sends elapsed step time).
    pub time: String,
    /// When the entry was folded into the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub received_at: Option<DateTime<Utc>>,
}

impl LogEntry {
    /// Derive a log entry from a step payload.
    pub fn from_step_log(log: StepLog, received_at: DateTime<Utc>) -> Self {
        let mut tools: Vec<String> = Vec::with_capacity(log.tools.len());
        for tool in log.tools {
            if !tools.contains(&tool) {
                tools.push(tool);
            }
        }

        Self {
            agent: log.agent,
            task: log.task,
            reasoning: log.reasoning,
            tools,
            confidence: clamp_confidence(log.confidence),
            next_action: log.next_action,
            time: log.time,
            received_at: Some(received_at),
        }
    }
}

/// Round to a whole percentage within `0..=100`.
fn clamp_confidence(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(MAX_CONFIDENCE)) as u8
}

/// One named stage of the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Step {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogEntry>,
}

impl Step {
    pub fn waiting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Waiting,
            log: None,
        }
    }
}

/// Where a session is in its lifecycle.
///
/// `Discarded` is never observed on a live session: it describes the value a
/// store hands back when a newer session replaces it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Created,
    Active,
    Terminal,
    Discarded,
}

/// The complete state of one pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSession {
    /// Server-issued id; `None` for the idle placeholder before any upload.
    pub session_id: Option<String>,
    /// Set once `pipeline_start` has been folded in.
    #[serde(default)]
    pub started: bool,
    pub steps: Vec<Step>,
    /// Index of the step most recently started, `None` before the first one.
    pub current_step_index: Option<usize>,
    /// Most-recent-first.
    pub logs: Vec<LogEntry>,
    pub result: Option<PipelineResult>,
    pub error: Option<String>,
    pub is_running: bool,
    pub is_complete: bool,
}

impl PipelineSession {
    /// A fresh session waiting for its first event.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            is_running: true,
            ..Self::default()
        }
    }

    /// Whether the session has reached completion or failure.
    pub fn is_terminal(&self) -> bool {
        self.is_complete || self.error.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_terminal() {
            SessionPhase::Terminal
        } else if self.is_running {
            SessionPhase::Active
        } else {
            SessionPhase::Created
        }
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    pub fn running_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Running)
            .count()
    }

    /// One-line progress summary, e.g. `Running step 2/5`.
    pub fn status_line(&self) -> String {
        if self.is_complete {
            "Pipeline complete".to_string()
        } else if let Some(error) = &self.error {
            format!("Failed: {error}")
        } else if self.is_running && !self.started {
            "Connecting to pipeline".to_string()
        } else if self.is_running {
            match self.current_step_index {
                Some(index) => format!("Running step {}/{}", index + 1, self.steps.len()),
                None => "Starting pipeline".to_string(),
            }
        } else if self.steps.is_empty() {
            "Upload a CV to start the pipeline".to_string()
        } else {
            "Ready".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_log(tools: Vec<&str>, confidence: f64) -> StepLog {
        StepLog {
            agent: "Matching Engine".to_string(),
            task: "Scored positions".to_string(),
            reasoning: "ATS keywords".to_string(),
            tools: tools.into_iter().map(String::from).collect(),
            confidence,
            next_action: "Queue top 8".to_string(),
            time: "0.8s".to_string(),
        }
    }

    #[test]
    fn test_log_entry_dedupes_tools_in_order() {
        let entry = LogEntry::from_step_log(
            step_log(vec!["ATS Simulator", "Scoring", "ATS Simulator"], 91.0),
            Utc::now(),
        );
        assert_eq!(entry.tools, vec!["ATS Simulator", "Scoring"]);
        assert_eq!(entry.confidence, 91);
        assert_eq!(entry.time, "0.8s");
    }

    #[test]
    fn test_log_entry_clamps_confidence() {
        let entry = LogEntry::from_step_log(step_log(vec![], 250.0), Utc::now());
        assert_eq!(entry.confidence, MAX_CONFIDENCE);

        let entry = LogEntry::from_step_log(step_log(vec![], -3.0), Utc::now());
        assert_eq!(entry.confidence, 0);

        let entry = LogEntry::from_step_log(step_log(vec![], 87.6), Utc::now());
        assert_eq!(entry.confidence, 88);
    }

    #[test]
    fn test_session_phase() {
        let mut session = PipelineSession::default();
        assert_eq!(session.phase(), SessionPhase::Created);
        assert_eq!(session.status_line(), "Upload a CV to start the pipeline");

        session = PipelineSession::new("abc");
        assert_eq!(session.phase(), SessionPhase::Active);

        session.error = Some("timeout".to_string());
        session.is_running = false;
        assert_eq!(session.phase(), SessionPhase::Terminal);
        assert_eq!(session.status_line(), "Failed: timeout");
    }

    #[test]
    fn test_status_line_running() {
        let mut session = PipelineSession::new("abc");
        assert_eq!(session.status_line(), "Connecting to pipeline");
        session.started = true;
        session.steps = vec![Step::waiting("a"), Step::waiting("b")];
        session.current_step_index = Some(1);
        assert_eq!(session.status_line(), "Running step 2/2");
    }
}
