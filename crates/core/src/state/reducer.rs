//! Pure reducer folding pipeline events into a session.
//!
//! `reduce` never reads a clock or performs I/O: the arrival instant is passed
//! in, so identical inputs always produce identical sessions.

use crate::error::WorkflowError;
use cf_protocol::event_models::{
    PipelineEvent, PipelineStartPayload, StepCompletePayload, StepStartPayload,
};
use cf_protocol::result_models::PipelineResult;
use cf_protocol::session_models::{LogEntry, PipelineSession, Step, StepStatus};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Largest `total_steps` a `pipeline_start` may announce.
pub const MAX_STEPS: usize = 256;

/// Apply one event to a session and return the next session.
///
/// Events arriving after a terminal state are ignored. Events that break the
/// step ordering end the session with a `Protocol error: ...` message; nothing
/// is reordered.
pub fn reduce(
    mut session: PipelineSession,
    event: PipelineEvent,
    received_at: DateTime<Utc>,
) -> PipelineSession {
    if session.is_terminal() {
        debug!(event = event.name(), "Ignoring event after terminal state");
        return session;
    }

    let name = event.name();
    if let Err(violation) = apply(&mut session, event, received_at) {
        warn!(event = name, %violation, "Protocol violation");
        fail(&mut session, WorkflowError::Protocol(violation).to_string());
    }
    session
}

fn apply(
    session: &mut PipelineSession,
    event: PipelineEvent,
    received_at: DateTime<Utc>,
) -> Result<(), String> {
    match event {
        PipelineEvent::PipelineError(payload) => {
            fail(session, WorkflowError::Pipeline(payload.error).to_string());
            Ok(())
        }
        PipelineEvent::PipelineStart(payload) => start(session, payload),
        other if !session.started => Err(format!("{} received before pipeline_start", other.name())),
        PipelineEvent::StepStart(payload) => step_start(session, payload),
        PipelineEvent::StepComplete(payload) => step_complete(session, payload, received_at),
        PipelineEvent::PipelineComplete(result) => {
            complete(session, result);
            Ok(())
        }
    }
}

fn start(session: &mut PipelineSession, payload: PipelineStartPayload) -> Result<(), String> {
    if session.started {
        return Err("duplicate pipeline_start".to_string());
    }
    if payload.total_steps > MAX_STEPS {
        return Err(format!(
            "pipeline_start announces {} steps (limit {MAX_STEPS})",
            payload.total_steps
        ));
    }

    session.steps = (0..payload.total_steps)
        .map(|i| {
            payload
                .steps
                .get(i)
                .map(|d| d.name.trim())
                .filter(|name| !name.is_empty())
                .map_or_else(|| Step::waiting(format!("Step {}", i + 1)), Step::waiting)
        })
        .collect();
    session.started = true;
    session.current_step_index = None;
    session.logs.clear();
    session.result = None;
    session.error = None;
    session.is_running = true;
    session.is_complete = false;
    Ok(())
}

fn running_index(session: &PipelineSession) -> Option<usize> {
    session
        .steps
        .iter()
        .position(|s| s.status == StepStatus::Running)
}

fn next_index(session: &PipelineSession) -> usize {
    session.current_step_index.map_or(0, |i| i + 1)
}

fn step_start(session: &mut PipelineSession, payload: StepStartPayload) -> Result<(), String> {
    let index = payload.step_index;
    let len = session.steps.len();

    if index >= len {
        return Err(format!("step_start index {index} out of range ({len} steps)"));
    }
    if let Some(running) = running_index(session) {
        return Err(format!("step_start({index}) while step {running} is still running"));
    }
    let expected = next_index(session);
    if index != expected {
        return Err(format!("step_start({index}) out of order, expected {expected}"));
    }

    if let Some(previous) = session.current_step_index {
        if session.steps[previous].status == StepStatus::Error {
            warn!(
                failed_step = previous,
                next_step = index,
                "Pipeline continues after a failed step"
            );
        }
    }

    session.steps[index].status = StepStatus::Running;
    session.current_step_index = Some(index);
    Ok(())
}

fn step_complete(
    session: &mut PipelineSession,
    payload: StepCompletePayload,
    received_at: DateTime<Utc>,
) -> Result<(), String> {
    let index = payload.step_index;
    let len = session.steps.len();

    if index >= len {
        return Err(format!("step_complete index {index} out of range ({len} steps)"));
    }

    match running_index(session) {
        Some(running) if running == index => {}
        Some(running) => {
            return Err(format!(
                "step_complete({index}) while step {running} is running"
            ));
        }
        None => {
            let expected = next_index(session);
            if index != expected {
                return Err(format!("step_complete({index}) out of order, expected {expected}"));
            }
            debug!(step = index, "step_complete without step_start");
            session.current_step_index = Some(index);
        }
    }

    let status = StepStatus::from(payload.status);
    if status == StepStatus::Error {
        warn!(
            step = index,
            error = payload.error.as_deref().unwrap_or("unknown"),
            "Step failed"
        );
    }

    let step = &mut session.steps[index];
    step.status = status;
    if let Some(log) = payload.log {
        let entry = LogEntry::from_step_log(log, received_at);
        step.log = Some(entry.clone());
        session.logs.insert(0, entry);
    }
    Ok(())
}

fn complete(session: &mut PipelineSession, result: PipelineResult) {
    session.result = Some(result);
    session.is_complete = true;
    session.is_running = false;
}

fn fail(session: &mut PipelineSession, message: String) {
    session.error = Some(message);
    session.is_running = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_protocol::event_models::{StepDescriptor, StepLog, StepOutcome};

    fn started(names: &[&str]) -> PipelineSession {
        let event = PipelineEvent::PipelineStart(PipelineStartPayload {
            total_steps: names.len(),
            steps: names
                .iter()
                .map(|n| StepDescriptor {
                    name: (*n).to_string(),
                    status: StepStatus::Waiting,
                })
                .collect(),
        });
        reduce(PipelineSession::new("s"), event, Utc::now())
    }

    fn step_start_event(index: usize) -> PipelineEvent {
        PipelineEvent::StepStart(StepStartPayload {
            step_index: index,
            step_name: String::new(),
            description: String::new(),
        })
    }

    fn step_complete_event(index: usize, status: StepOutcome, log: bool) -> PipelineEvent {
        PipelineEvent::StepComplete(StepCompletePayload {
            step_index: index,
            step_name: String::new(),
            status,
            data: None,
            log: log.then(|| StepLog {
                agent: format!("agent-{index}"),
                task: String::new(),
                reasoning: String::new(),
                tools: Vec::new(),
                confidence: 90.0,
                next_action: String::new(),
                time: "0.5s".to_string(),
            }),
            error: None,
        })
    }

    fn fold(session: PipelineSession, events: Vec<PipelineEvent>) -> PipelineSession {
        events
            .into_iter()
            .fold(session, |s, e| reduce(s, e, Utc::now()))
    }

    #[test]
    fn test_pipeline_start_names_missing_steps() {
        let event = PipelineEvent::PipelineStart(PipelineStartPayload {
            total_steps: 3,
            steps: vec![StepDescriptor {
                name: "Resume Parser".to_string(),
                status: StepStatus::Waiting,
            }],
        });
        let session = reduce(PipelineSession::new("s"), event, Utc::now());

        let names: Vec<&str> = session.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Resume Parser", "Step 2", "Step 3"]);
        assert!(session.steps.iter().all(|s| s.status == StepStatus::Waiting));
        assert_eq!(session.current_step_index, None);
        assert!(session.is_running && session.started);
    }

    #[test]
    fn test_step_event_before_start_is_violation() {
        let session = reduce(PipelineSession::new("s"), step_start_event(0), Utc::now());
        assert!(session
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Protocol error:")));
        assert!(!session.is_running);
    }

    #[test]
    fn test_pipeline_error_before_start_is_accepted() {
        let session = reduce(
            PipelineSession::new("s"),
            PipelineEvent::error("Session not found"),
            Utc::now(),
        );
        assert_eq!(session.error.as_deref(), Some("Session not found"));
    }

    #[test]
    fn test_out_of_order_step_start_is_violation() {
        let session = fold(
            started(&["a", "b", "c"]),
            vec![
                step_start_event(0),
                step_complete_event(0, StepOutcome::Completed, false),
                step_start_event(2),
            ],
        );
        assert!(session.error.as_deref().is_some_and(|e| e.contains("expected 1")));
        assert_eq!(session.steps[2].status, StepStatus::Waiting);
        assert_eq!(session.current_step_index, Some(0));
    }

    #[test]
    fn test_second_running_step_is_violation() {
        let session = fold(
            started(&["a", "b"]),
            vec![step_start_event(0), step_start_event(1)],
        );
        assert!(session.is_terminal());
        assert_eq!(session.running_count(), 1);
    }

    #[test]
    fn test_step_complete_implies_start() {
        let session = fold(
            started(&["a", "b"]),
            vec![step_complete_event(0, StepOutcome::Completed, true)],
        );
        assert_eq!(session.current_step_index, Some(0));
        assert_eq!(session.steps[0].status, StepStatus::Completed);
        assert_eq!(session.logs.len(), 1);
        assert_eq!(session.steps[0].log, session.logs.first().cloned());
        assert!(session.error.is_none());
    }

    #[test]
    fn test_continuation_after_failed_step() {
        let session = fold(
            started(&["a", "b"]),
            vec![
                step_start_event(0),
                step_complete_event(0, StepOutcome::Error, false),
                step_start_event(1),
            ],
        );
        assert!(session.error.is_none());
        assert_eq!(session.steps[0].status, StepStatus::Error);
        assert_eq!(session.steps[1].status, StepStatus::Running);
    }

    #[test]
    fn test_events_after_terminal_are_ignored() {
        let terminal = fold(
            started(&["a"]),
            vec![step_start_event(0), PipelineEvent::error("boom")],
        );
        let after = fold(
            terminal.clone(),
            vec![
                step_complete_event(0, StepOutcome::Completed, true),
                PipelineEvent::PipelineComplete(PipelineResult::default()),
            ],
        );
        assert_eq!(after, terminal);
        assert!(!after.is_complete);
    }

    #[test]
    fn test_oversized_total_steps_is_violation() {
        for total_steps in [MAX_STEPS + 1, usize::MAX] {
            let event = PipelineEvent::PipelineStart(PipelineStartPayload {
                total_steps,
                steps: Vec::new(),
            });
            let session = reduce(PipelineSession::new("s"), event, Utc::now());

            assert!(session.steps.is_empty());
            assert!(!session.started && !session.is_running);
            assert!(session
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("Protocol error:") && e.contains("limit")));
        }

        let at_limit = PipelineEvent::PipelineStart(PipelineStartPayload {
            total_steps: MAX_STEPS,
            steps: Vec::new(),
        });
        let session = reduce(PipelineSession::new("s"), at_limit, Utc::now());
        assert_eq!(session.steps.len(), MAX_STEPS);
        assert!(session.error.is_none());
    }

    #[test]
    fn test_duplicate_pipeline_start_is_violation() {
        let session = fold(
            started(&["a"]),
            vec![PipelineEvent::PipelineStart(PipelineStartPayload {
                total_steps: 1,
                steps: Vec::new(),
            })],
        );
        assert!(session.error.as_deref().is_some_and(|e| e.contains("duplicate")));
    }
}
