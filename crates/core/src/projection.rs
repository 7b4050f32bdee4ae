//! Activity log projection.
//!
//! Turns the session's log list into a bounded, display-ready view. Pure: the
//! current instant is an argument and nothing is mutated.

use cf_protocol::session_models::LogEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const EMPTY_HEADER: &str = "Waiting for agents to start...";

/// One rendered activity line.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub agent: String,
    pub task: String,
    pub reasoning: String,
    pub tools: Vec<String>,
    pub confidence: u8,
    pub next_action: String,
    pub time: String,
    /// Human-relative age such as `12s ago`.
    pub age: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogView {
    pub header: String,
    /// Number of entries in the session, shown or not.
    pub total: usize,
    /// Most recent first, at most `max` lines.
    pub lines: Vec<LogLine>,
}

/// Project `logs` (most-recent-first) into at most `max` lines.
pub fn project(logs: &[LogEntry], max: usize, now: DateTime<Utc>) -> ActivityLogView {
    let header = if logs.is_empty() {
        EMPTY_HEADER.to_string()
    } else {
        format!("{} events logged", logs.len())
    };

    ActivityLogView {
        header,
        total: logs.len(),
        lines: logs
            .iter()
            .take(max)
            .map(|entry| LogLine {
                agent: entry.agent.clone(),
                task: entry.task.clone(),
                reasoning: entry.reasoning.clone(),
                tools: entry.tools.clone(),
                confidence: entry.confidence,
                next_action: entry.next_action.clone(),
                time: entry.time.clone(),
                age: entry
                    .received_at
                    .map_or_else(|| entry.time.clone(), |at| relative_age(at, now)),
            })
            .collect(),
    }
}

/// `just now`, `Ns ago`, `Nm ago`, `Nh ago` or `Nd ago`.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    match secs {
        s if s < 5 => "just now".to_string(),
        s if s < 60 => format!("{s}s ago"),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}
