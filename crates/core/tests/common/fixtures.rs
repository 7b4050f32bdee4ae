//! Test fixtures for pipeline events, agents and configuration directories.

use cf_protocol::agent_models::SimulatedAgent;
use cf_protocol::event_models::{
    PipelineEvent, PipelineStartPayload, StepCompletePayload, StepDescriptor, StepLog,
    StepOutcome, StepStartPayload,
};
use cf_protocol::result_models::{MatchedJob, PipelineResult, Profile};
use cf_protocol::session_models::StepStatus;
use tempfile::TempDir;

/// The three step names used by the scenario tests.
pub const SCENARIO_STEPS: [&str; 3] = ["Profile Analyzer", "Matching Engine", "Outreach Agent"];

pub fn pipeline_start(names: &[&str]) -> PipelineEvent {
    PipelineEvent::PipelineStart(PipelineStartPayload {
        total_steps: names.len(),
        steps: names
            .iter()
            .map(|name| StepDescriptor {
                name: (*name).to_string(),
                status: StepStatus::Waiting,
            })
            .collect(),
    })
}

pub fn step_start(index: usize) -> PipelineEvent {
    PipelineEvent::StepStart(StepStartPayload {
        step_index: index,
        step_name: SCENARIO_STEPS.get(index).copied().unwrap_or_default().to_string(),
        description: String::new(),
    })
}

pub fn log_for(index: usize) -> StepLog {
    StepLog {
        agent: SCENARIO_STEPS.get(index).copied().unwrap_or("Agent").to_string(),
        task: format!("task {index}"),
        reasoning: format!("reasoning {index}"),
        tools: vec!["Tool".to_string()],
        confidence: 90.0,
        next_action: format!("next {index}"),
        time: format!("{index}.5s"),
    }
}

pub fn step_completed(index: usize, log: Option<StepLog>) -> PipelineEvent {
    PipelineEvent::StepComplete(StepCompletePayload {
        step_index: index,
        step_name: SCENARIO_STEPS.get(index).copied().unwrap_or_default().to_string(),
        status: StepOutcome::Completed,
        data: None,
        log,
        error: None,
    })
}

pub fn step_failed(index: usize, error: &str) -> PipelineEvent {
    PipelineEvent::StepComplete(StepCompletePayload {
        step_index: index,
        step_name: SCENARIO_STEPS.get(index).copied().unwrap_or_default().to_string(),
        status: StepOutcome::Error,
        data: None,
        log: None,
        error: Some(error.to_string()),
    })
}

pub fn sample_result() -> PipelineResult {
    PipelineResult {
        profile: Profile {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            skills: vec!["Rust".to_string(), "Go".to_string()],
        },
        matched_jobs: vec![MatchedJob {
            job_id: "j-1".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            match_score: 87.5,
            ..MatchedJob::default()
        }],
        ..PipelineResult::default()
    }
}

/// Scenario A: three steps, all completing with logs.
pub fn happy_path() -> Vec<PipelineEvent> {
    vec![
        pipeline_start(&SCENARIO_STEPS),
        step_start(0),
        step_completed(0, Some(log_for(0))),
        step_start(1),
        step_completed(1, Some(log_for(1))),
        step_start(2),
        step_completed(2, Some(log_for(2))),
        PipelineEvent::PipelineComplete(sample_result()),
    ]
}

/// Scenario B: step 1 fails, then the run fails.
pub fn mid_run_failure() -> Vec<PipelineEvent> {
    vec![
        pipeline_start(&SCENARIO_STEPS),
        step_start(0),
        step_completed(0, Some(log_for(0))),
        step_failed(1, "timeout"),
        PipelineEvent::error("timeout"),
    ]
}

/// Encode events as an SSE body.
pub fn sse_body(events: &[PipelineEvent]) -> String {
    events
        .iter()
        .filter_map(|e| e.to_sse_frame().ok())
        .collect()
}

/// A fast agent: `duration` seconds is `duration * 10` ticks.
pub fn agent(name: &str, duration: f64) -> SimulatedAgent {
    SimulatedAgent {
        name: name.to_string(),
        duration,
        order: 0,
        task: format!("{name} task"),
        tools: vec!["Tool".to_string()],
        confidence: 90,
        next_action: "next".to_string(),
        reasoning: format!("{name} reasoning"),
    }
}

/// Create a temporary project with a `.careerflow/` configuration.
///
/// Returns a TempDir that must be kept alive for the test duration.
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(".careerflow/agents"))?;

    std::fs::write(
        root.join(".careerflow/config.toml"),
        "demo_mode = true\ntick_interval_ms = 10\nseed = 11\n",
    )?;

    let first = r#"---
name: Resume Parser
duration: 0.2
order: 1
task: Parsed resume
tools: [PDF Reader, PDF Reader, NER]
confidence: 140
next-action: Detect role
---
Found 12 skills"#;
    let second = r#"---
name: Role Detector
duration: 0.3
order: 2
task: Detected role
---
Senior Backend Engineer"#;

    std::fs::write(root.join(".careerflow/agents/parser.md"), first)?;
    std::fs::write(root.join(".careerflow/agents/role.md"), second)?;

    Ok(temp_dir)
}
