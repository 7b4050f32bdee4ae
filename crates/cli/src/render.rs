//! Terminal rendering of pipeline sessions.
//!
//! The [`Presenter`] is subscribed to the session store and prints only what
//! changed between two states, with the log of each finished step. The final
//! summary uses the activity log projection.

use cf_core::projection::{project, ActivityLogView};
use cf_core::simulation::SimulationSnapshot;
use cf_protocol::result_models::{HealthStatus, MatchTier, PipelineResult, SessionStatus, UploadResponse};
use cf_protocol::session_models::{LogEntry, PipelineSession, StepStatus};
use chrono::Utc;
use colored::{ColoredString, Colorize};

/// Color-coded status label.
pub fn status_badge(status: StepStatus) -> ColoredString {
    let label = format!("{:<7}", status.label());
    match status {
        StepStatus::Waiting => label.dimmed(),
        StepStatus::Running => label.yellow().bold(),
        StepStatus::Completed => label.green(),
        StepStatus::Error => label.red().bold(),
    }
}

pub fn step_line(index: usize, total: usize, name: &str, status: StepStatus) -> String {
    format!("[{}/{}] {} {}", index + 1, total, status_badge(status), name)
}

pub fn log_line(entry: &LogEntry) -> String {
    let mut line = format!(
        "  {} {} ({}% confidence, {})",
        "›".cyan(),
        entry.task,
        entry.confidence,
        entry.time
    );
    if !entry.reasoning.is_empty() {
        line.push_str(&format!("\n    {}", entry.reasoning.dimmed()));
    }
    if !entry.tools.is_empty() {
        line.push_str(&format!("\n    tools: {}", entry.tools.join(", ")));
    }
    if !entry.next_action.is_empty() {
        line.push_str(&format!("\n    next: {}", entry.next_action));
    }
    line
}

/// Prints the difference between consecutive session states.
#[derive(Default)]
pub struct Presenter {
    statuses: Vec<StepStatus>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_state(&mut self, session: &PipelineSession) {
        for line in self.changes(session) {
            println!("{line}");
        }
    }

    /// Lines describing what changed since the previous state.
    pub fn changes(&mut self, session: &PipelineSession) -> Vec<String> {
        let mut lines = Vec::new();

        if session.steps.len() != self.statuses.len() {
            self.statuses = vec![StepStatus::Waiting; session.steps.len()];
            if !session.steps.is_empty() {
                lines.push(format!(
                    "{} {} steps",
                    "Pipeline started:".bold(),
                    session.steps.len()
                ));
            }
        }

        let total = session.steps.len();
        for (i, step) in session.steps.iter().enumerate() {
            if self.statuses[i] != step.status {
                self.statuses[i] = step.status;
                lines.push(step_line(i, total, &step.name, step.status));
                if let Some(entry) = &step.log {
                    lines.push(log_line(entry));
                }
            }
        }
        lines
    }
}

pub fn print_activity(view: &ActivityLogView) {
    println!("\n{}", "Activity".bold());
    println!("{}", view.header.dimmed());
    for line in &view.lines {
        println!(
            "  {:<22} {:<50} {}",
            line.agent.cyan(),
            line.task,
            line.age.dimmed()
        );
    }
}

pub fn print_result(result: &PipelineResult) {
    println!("\n{}", "Result".bold());
    if !result.profile.name.is_empty() {
        println!("  Candidate: {} <{}>", result.profile.name, result.profile.email);
    }
    if !result.detected_role.primary_role.is_empty() {
        println!(
            "  Role:      {} ({}, {})",
            result.detected_role.primary_role,
            result.detected_role.seniority,
            result.detected_role.location
        );
    }

    if !result.matched_jobs.is_empty() {
        println!("\n  {}", "Matched jobs".bold());
        for job in &result.matched_jobs {
            let score = format!("{:>5.1}%", job.match_score);
            let score = match job.tier() {
                MatchTier::Strong => score.green(),
                MatchTier::Fair => score.yellow(),
                MatchTier::Weak => score.red(),
            };
            println!("  {} {} at {} ({})", score, job.title, job.company, job.location);
        }
    }

    if !result.applications.is_empty() {
        println!("\n  {}", "Applications".bold());
        for app in &result.applications {
            println!("  [{}] {} at {}", app.status, app.title, app.company);
        }
    }
}

/// Final summary after a session ended.
pub fn print_summary(session: &PipelineSession, log_limit: usize) {
    print_activity(&project(&session.logs, log_limit, Utc::now()));

    if let Some(result) = &session.result {
        print_result(result);
    }
    match &session.error {
        Some(error) => println!("\n{} {}", "Pipeline failed:".red().bold(), error),
        None => println!("\n{}", session.status_line().green().bold()),
    }
}

pub fn print_metrics(snapshot: &SimulationSnapshot) {
    println!(
        "\nAgents Done {}   Tokens {}   Time {}",
        snapshot.done_label().bold(),
        snapshot.tokens_label().bold(),
        snapshot.time_label().bold()
    );
}

pub fn print_upload(upload: &UploadResponse) {
    println!(
        "{} {} ({} skills) session {}",
        "Uploaded".green().bold(),
        upload.filename,
        upload.profile.skill_count,
        upload.session_id.dimmed()
    );
}

pub fn offline_banner(base_url: &str) -> String {
    format!(
        "{} backend at {} is unreachable",
        "Offline:".yellow().bold(),
        base_url
    )
}

pub fn print_health(base_url: &str, health: Option<&HealthStatus>) {
    match health {
        Some(health) if health.is_ok() => {
            let mode = if health.demo_mode { " (demo mode)" } else { "" };
            println!("{} {}{}", "Online:".green().bold(), base_url, mode);
        }
        Some(health) => println!("{} status '{}'", "Degraded:".yellow().bold(), health.status),
        None => println!("{}", offline_banner(base_url)),
    }
}

pub fn print_status(status: &SessionStatus) {
    println!("Session {}: {}", status.session_id, status.status.bold());
    if let Some(result) = &status.result {
        print_result(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_protocol::session_models::Step;

    #[test]
    fn test_presenter_prints_only_changes() {
        colored::control::set_override(false);

        let mut presenter = Presenter::new();
        let mut session = PipelineSession::new("s");
        assert!(presenter.changes(&session).is_empty());

        session.started = true;
        session.steps = vec![Step::waiting("Resume Parser"), Step::waiting("Role Detector")];
        let lines = presenter.changes(&session);
        assert_eq!(lines, vec!["Pipeline started: 2 steps".to_string()]);

        session.steps[0].status = StepStatus::Running;
        let lines = presenter.changes(&session);
        assert_eq!(lines, vec!["[1/2] Running Resume Parser".to_string()]);

        assert!(presenter.changes(&session).is_empty());
    }

    #[test]
    fn test_offline_banner() {
        colored::control::set_override(false);
        assert_eq!(
            offline_banner("http://localhost:8000"),
            "Offline: backend at http://localhost:8000 is unreachable"
        );
    }
}
