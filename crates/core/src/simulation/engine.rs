//! Deterministic simulated pipeline.
//!
//! The engine is a pure state machine advanced one tick at a time. It emits
//! the same `PipelineEvent` vocabulary as the live stream, so the store folds
//! simulated and real runs identically. Wall-clock scheduling lives in
//! [`crate::simulation::driver`].

use cf_protocol::agent_models::SimulatedAgent;
use cf_protocol::event_models::{
    PipelineEvent, PipelineStartPayload, StepCompletePayload, StepDescriptor, StepLog,
    StepOutcome, StepStartPayload,
};
use cf_protocol::result_models::{
    Application, DetectedRole, MatchedJob, PipelineResult, Profile,
};
use cf_protocol::session_models::StepStatus;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;

/// Ticks per second of nominal agent duration.
pub const TICKS_PER_SECOND: f64 = 10.0;

const BASE_TOKENS: f64 = 1500.0;
const TOKEN_SPREAD: f64 = 8000.0;
const COMPLETE: f64 = 100.0;
const EPSILON: f64 = 1e-9;

/// Live metrics of one simulated agent.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AgentProgress {
    pub name: String,
    pub status: StepStatus,
    /// 0.0..=100.0
    pub progress: f64,
    pub tokens: u64,
    /// Simulated seconds spent, rounded to 0.1.
    pub time: f64,
}

/// Point-in-time view of the whole simulation.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct SimulationSnapshot {
    pub agents: Vec<AgentProgress>,
    pub running: bool,
    pub paused: bool,
    pub finished: bool,
}

impl SimulationSnapshot {
    pub fn completed_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.status == StepStatus::Completed)
            .count()
    }

    pub fn total_tokens(&self) -> u64 {
        self.agents.iter().map(|a| a.tokens).sum()
    }

    pub fn total_time(&self) -> f64 {
        self.agents.iter().map(|a| a.time).sum()
    }

    /// Token total as the dashboard prints it: `12.4k` above 1000.
    pub fn tokens_label(&self) -> String {
        format_tokens(self.total_tokens())
    }

    /// `Agents Done` counter, e.g. `3/6`.
    pub fn done_label(&self) -> String {
        format!("{}/{}", self.completed_count(), self.agents.len())
    }

    pub fn time_label(&self) -> String {
        format!("{:.1}s", self.total_time())
    }
}

pub fn format_tokens(tokens: u64) -> String {
    if tokens > 1000 {
        format!("{:.1}k", tokens as f64 / 1000.0)
    } else {
        tokens.to_string()
    }
}

/// Pure simulated workflow.
///
/// `start()` announces the pipeline, each `tick()` advances the active agent
/// by `100 / (duration * 10)` percent. Progress is derived from an integer tick
/// counter, so a paused engine resumes from exactly the progress it froze at.
pub struct SimulatedWorkflowEngine {
    agents: Vec<SimulatedAgent>,
    seed: Option<u64>,
    rng: StdRng,
    /// Ticks spent on each agent.
    ticks: Vec<u32>,
    /// Token budget of each agent, drawn when it starts.
    budgets: Vec<f64>,
    statuses: Vec<StepStatus>,
    active: Option<usize>,
    running: bool,
    paused: bool,
    finished: bool,
}

impl SimulatedWorkflowEngine {
    /// Create an engine over an ordered agent table.
    ///
    /// With a seed the token metrics are reproducible across runs and resets.
    pub fn new(agents: Vec<SimulatedAgent>, seed: Option<u64>) -> Self {
        let len = agents.len();
        Self {
            agents,
            seed,
            rng: make_rng(seed),
            ticks: vec![0; len],
            budgets: vec![0.0; len],
            statuses: vec![StepStatus::Waiting; len],
            active: None,
            running: false,
            paused: false,
            finished: false,
        }
    }

    pub fn agents(&self) -> &[SimulatedAgent] {
        &self.agents
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Begin a run from the initial state.
    ///
    /// Returns `pipeline_start` followed by `step_start(0)`, or an immediate
    /// `pipeline_complete` for an empty agent table.
    pub fn start(&mut self) -> Vec<PipelineEvent> {
        self.reset();
        self.running = true;

        let mut events = vec![PipelineEvent::PipelineStart(PipelineStartPayload {
            total_steps: self.agents.len(),
            steps: self
                .agents
                .iter()
                .map(|a| StepDescriptor {
                    name: a.name.clone(),
                    status: StepStatus::Waiting,
                })
                .collect(),
        })];

        if self.agents.is_empty() {
            events.push(self.finish());
        } else {
            events.push(self.begin_step(0));
        }
        events
    }

    /// Advance the active agent by one tick.
    ///
    /// Emits nothing while idle, paused or finished.
    pub fn tick(&mut self) -> Vec<PipelineEvent> {
        if !self.running || self.paused || self.finished {
            return Vec::new();
        }
        let Some(index) = self.active else {
            return Vec::new();
        };

        self.ticks[index] += 1;
        if self.progress_of(index) < COMPLETE {
            return Vec::new();
        }

        let mut events = vec![self.complete_step(index)];
        let next = index + 1;
        if next < self.agents.len() {
            events.push(self.begin_step(next));
        } else {
            events.push(self.finish());
        }
        events
    }

    /// Freeze progress. Returns `false` if there is nothing to pause.
    pub fn pause(&mut self) -> bool {
        if !self.running || self.paused || self.finished {
            return false;
        }
        self.paused = true;
        true
    }

    /// Continue from the frozen progress. Returns `false` if not paused.
    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    /// Return to the all-waiting initial state, not running and not paused.
    pub fn reset(&mut self) {
        let len = self.agents.len();
        self.rng = make_rng(self.seed);
        self.ticks = vec![0; len];
        self.budgets = vec![0.0; len];
        self.statuses = vec![StepStatus::Waiting; len];
        self.active = None;
        self.running = false;
        self.paused = false;
        self.finished = false;
    }

    /// Progress of the agent at `index`, 0.0..=100.0.
    pub fn progress_of(&self, index: usize) -> f64 {
        let Some(agent) = self.agents.get(index) else {
            return 0.0;
        };
        let step = COMPLETE / (agent.duration * TICKS_PER_SECOND);
        let progress = f64::from(self.ticks[index]) * step;
        if progress >= COMPLETE - EPSILON {
            COMPLETE
        } else {
            progress
        }
    }

    /// Current metrics of every agent.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            agents: (0..self.agents.len())
                .map(|i| {
                    let progress = self.progress_of(i);
                    AgentProgress {
                        name: self.agents[i].name.clone(),
                        status: self.statuses[i],
                        progress,
                        tokens: self.tokens_of(i, progress),
                        time: self.time_of(i, progress),
                    }
                })
                .collect(),
            running: self.running,
            paused: self.paused,
            finished: self.finished,
        }
    }

    fn tokens_of(&self, index: usize, progress: f64) -> u64 {
        (progress / COMPLETE * self.budgets[index]).round() as u64
    }

    fn time_of(&self, index: usize, progress: f64) -> f64 {
        (progress / COMPLETE * self.agents[index].duration * 10.0).round() / 10.0
    }

    fn begin_step(&mut self, index: usize) -> PipelineEvent {
        self.budgets[index] = BASE_TOKENS + self.rng.gen::<f64>() * TOKEN_SPREAD;
        self.statuses[index] = StepStatus::Running;
        self.active = Some(index);

        let agent = &self.agents[index];
        PipelineEvent::StepStart(StepStartPayload {
            step_index: index,
            step_name: agent.name.clone(),
            description: agent.task.clone(),
        })
    }

    fn complete_step(&mut self, index: usize) -> PipelineEvent {
        self.statuses[index] = StepStatus::Completed;
        let tokens = self.tokens_of(index, COMPLETE);
        let agent = &self.agents[index];

        PipelineEvent::StepComplete(StepCompletePayload {
            step_index: index,
            step_name: agent.name.clone(),
            status: StepOutcome::Completed,
            data: Some(json!({
                "progress": COMPLETE,
                "tokens": tokens,
                "time": agent.duration,
            })),
            log: Some(StepLog {
                agent: agent.name.clone(),
                task: agent.task.clone(),
                reasoning: agent.reasoning.clone(),
                tools: agent.tools.clone(),
                confidence: f64::from(agent.confidence),
                next_action: agent.next_action.clone(),
                time: format!("{:.1}s", agent.duration),
            }),
            error: None,
        })
    }

    fn finish(&mut self) -> PipelineEvent {
        self.active = None;
        self.running = false;
        self.finished = true;
        PipelineEvent::PipelineComplete(demo_result(&self.agents))
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Canned result shown at the end of a demo run.
pub fn demo_result(agents: &[SimulatedAgent]) -> PipelineResult {
    let matched_jobs = vec![
        MatchedJob {
            job_id: "demo-1".to_string(),
            title: "Senior Backend Engineer".to_string(),
            company: "Nordwind Logistics".to_string(),
            location: "Berlin (Remote)".to_string(),
            match_score: 92.0,
            url: "https://jobs.example.com/demo-1".to_string(),
            salary: "€80k - €95k".to_string(),
        },
        MatchedJob {
            job_id: "demo-2".to_string(),
            title: "Platform Engineer".to_string(),
            company: "Kiezcloud".to_string(),
            location: "Berlin".to_string(),
            match_score: 84.0,
            url: "https://jobs.example.com/demo-2".to_string(),
            salary: "€75k - €90k".to_string(),
        },
        MatchedJob {
            job_id: "demo-3".to_string(),
            title: "Go Developer".to_string(),
            company: "Spreeware".to_string(),
            location: "Remote (EU)".to_string(),
            match_score: 71.0,
            url: "https://jobs.example.com/demo-3".to_string(),
            salary: "€65k - €80k".to_string(),
        },
    ];

    let applications = matched_jobs
        .iter()
        .take(2)
        .map(|job| Application {
            title: job.title.clone(),
            company: job.company.clone(),
            match_score: job.match_score,
            cover_letter: format!(
                "Dear {} hiring team, I am excited to apply for the {} role.",
                job.company, job.title
            ),
            status: "ready".to_string(),
            url: job.url.clone(),
        })
        .collect();

    PipelineResult {
        profile: Profile {
            name: "Demo Candidate".to_string(),
            email: "candidate@example.com".to_string(),
            phone: String::new(),
            skills: vec![
                "Python".to_string(),
                "Go".to_string(),
                "Kubernetes".to_string(),
                "PostgreSQL".to_string(),
            ],
        },
        detected_role: DetectedRole {
            primary_role: "Senior Backend Engineer".to_string(),
            secondary_roles: vec!["Platform Engineer".to_string()],
            seniority: "Senior".to_string(),
            location: "Berlin".to_string(),
        },
        matched_jobs,
        applications,
        logs: agents
            .iter()
            .map(|a| json!({ "agent": a.name, "task": a.task }))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, duration: f64) -> SimulatedAgent {
        SimulatedAgent {
            name: name.to_string(),
            duration,
            order: 0,
            task: format!("{name} task"),
            tools: vec!["Tool".to_string()],
            confidence: 90,
            next_action: "Next".to_string(),
            reasoning: "Because".to_string(),
        }
    }

    #[test]
    fn test_start_announces_pipeline_and_first_step() {
        let mut engine = SimulatedWorkflowEngine::new(vec![agent("A", 1.0), agent("B", 2.0)], Some(1));
        let events = engine.start();

        assert_eq!(events.len(), 2);
        let PipelineEvent::PipelineStart(start) = &events[0] else {
            panic!("expected pipeline_start");
        };
        assert_eq!(start.total_steps, 2);
        assert!(start.steps.iter().all(|s| s.status == StepStatus::Waiting));
        assert!(matches!(&events[1], PipelineEvent::StepStart(s) if s.step_index == 0));
        assert!(engine.is_running());
    }

    #[test]
    fn test_tick_completes_after_duration() {
        let mut engine = SimulatedWorkflowEngine::new(vec![agent("A", 1.0), agent("B", 1.0)], Some(1));
        engine.start();

        for _ in 0..9 {
            assert!(engine.tick().is_empty());
        }
        assert!((engine.progress_of(0) - 90.0).abs() < 1e-6);

        let events = engine.tick();
        assert_eq!(events.len(), 2);
        let PipelineEvent::StepComplete(done) = &events[0] else {
            panic!("expected step_complete");
        };
        assert_eq!(done.step_index, 0);
        assert_eq!(done.log.as_ref().map(|l| l.time.as_str()), Some("1.0s"));
        assert!(matches!(&events[1], PipelineEvent::StepStart(s) if s.step_index == 1));
    }

    #[test]
    fn test_fractional_step_completes_on_time() {
        // 3s agent: 100/30 percent per tick
        let mut engine = SimulatedWorkflowEngine::new(vec![agent("A", 3.0)], Some(1));
        engine.start();

        let mut ticks = 0;
        loop {
            ticks += 1;
            let events = engine.tick();
            if !events.is_empty() {
                assert!(events.last().is_some_and(PipelineEvent::is_terminal));
                break;
            }
        }
        assert_eq!(ticks, 30);
        assert!(engine.is_finished());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_pause_freezes_progress() {
        let mut engine = SimulatedWorkflowEngine::new(vec![agent("A", 1.0)], Some(1));
        engine.start();
        for _ in 0..4 {
            engine.tick();
        }
        assert!(engine.pause());
        for _ in 0..50 {
            assert!(engine.tick().is_empty());
        }
        assert!((engine.progress_of(0) - 40.0).abs() < 1e-6);

        assert!(engine.resume());
        engine.tick();
        assert!((engine.progress_of(0) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut engine = SimulatedWorkflowEngine::new(vec![agent("A", 1.0)], Some(1));
        engine.start();
        engine.tick();
        engine.pause();

        engine.reset();
        let once = engine.snapshot();
        engine.reset();
        assert_eq!(engine.snapshot(), once);
        assert!(!once.running && !once.paused && !once.finished);
        assert!(once.agents.iter().all(|a| a.status == StepStatus::Waiting && a.progress == 0.0));
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let agents = vec![agent("A", 0.5), agent("B", 0.7)];
        let mut first = SimulatedWorkflowEngine::new(agents.clone(), Some(7));
        let mut second = SimulatedWorkflowEngine::new(agents, Some(7));

        assert_eq!(first.start(), second.start());
        for _ in 0..20 {
            assert_eq!(first.tick(), second.tick());
            assert_eq!(first.snapshot(), second.snapshot());
        }
    }

    #[test]
    fn test_empty_agent_table_completes_immediately() {
        let mut engine = SimulatedWorkflowEngine::new(Vec::new(), None);
        let events = engine.start();
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());
        assert!(engine.is_finished());
    }

    #[test]
    fn test_snapshot_labels() {
        assert_eq!(format_tokens(950), "950");
        assert_eq!(format_tokens(1000), "1000");
        assert_eq!(format_tokens(12_340), "12.3k");

        let mut engine = SimulatedWorkflowEngine::new(vec![agent("A", 1.0), agent("B", 1.0)], Some(3));
        engine.start();
        for _ in 0..10 {
            engine.tick();
        }
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.done_label(), "1/2");
        assert_eq!(snapshot.time_label(), "1.0s");
        assert!(snapshot.agents[0].tokens >= 1500 && snapshot.agents[0].tokens <= 9500);
    }
}
