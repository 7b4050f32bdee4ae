//! Built-in agent table used when `.careerflow/agents/` is absent.

use cf_protocol::agent_models::SimulatedAgent;

struct AgentTemplate {
    name: &'static str,
    duration: f64,
    task: &'static str,
    reasoning: &'static str,
    tools: &'static [&'static str],
    confidence: u32,
    next_action: &'static str,
}

const DEFAULT_AGENTS: [AgentTemplate; 6] = [
    AgentTemplate {
        name: "Profile Analyzer",
        duration: 4.0,
        task: "Updated skill matrix from latest CV upload",
        reasoning: "Detected 2 new certifications, adjusted competency scores for cloud infrastructure",
        tools: &["CV Parser", "Skill Taxonomy"],
        confidence: 96,
        next_action: "Re-calibrate matching weights",
    },
    AgentTemplate {
        name: "Job Intelligence",
        duration: 6.0,
        task: "Scanning LinkedIn & Indeed for Senior Backend roles in Berlin",
        reasoning: "Filtering by 3+ years Python/Go experience, remote-first companies with >50 employees",
        tools: &["LinkedIn API", "Indeed Scraper", "Company DB"],
        confidence: 92,
        next_action: "Pass 47 filtered listings to Matching Engine",
    },
    AgentTemplate {
        name: "Matching Engine",
        duration: 5.0,
        task: "Scored 23 new positions against profile",
        reasoning: "Applied ATS keyword optimization, weighted location preference and salary range",
        tools: &["Scoring Algorithm", "ATS Simulator"],
        confidence: 91,
        next_action: "Queue top 8 for personalization",
    },
    AgentTemplate {
        name: "Personalization Agent",
        duration: 7.0,
        task: "Generated 8 tailored CVs and cover letters",
        reasoning: "Matched keywords per job description, adjusted tone for company culture fit",
        tools: &["CV Generator", "Tone Analyzer", "Keyword Injector"],
        confidence: 89,
        next_action: "Send to Outreach Agent for delivery",
    },
    AgentTemplate {
        name: "Outreach Agent",
        duration: 4.0,
        task: "Sent personalized emails to 8 HR contacts",
        reasoning: "High match scores (>88%), warm intro possible via 3 mutual connections",
        tools: &["Email Composer", "Contact Finder", "Gmail API"],
        confidence: 88,
        next_action: "Schedule follow-ups in 3 days",
    },
    AgentTemplate {
        name: "Interview Prep Agent",
        duration: 3.0,
        task: "Generated company-specific interview prep kits",
        reasoning: "Analyzed Glassdoor reviews and recent blog posts for question pattern prediction",
        tools: &["Glassdoor Scraper", "Question Generator", "STAR Formatter"],
        confidence: 94,
        next_action: "Notify user: prep materials ready",
    },
];

/// The six agents of the CareerOS dashboard, in execution order.
pub fn default_agents() -> Vec<SimulatedAgent> {
    DEFAULT_AGENTS
        .iter()
        .zip(1u32..)
        .map(|(t, order)| SimulatedAgent {
            name: t.name.to_string(),
            duration: t.duration,
            order,
            task: t.task.to_string(),
            tools: t.tools.iter().map(|s| (*s).to_string()).collect(),
            confidence: t.confidence,
            next_action: t.next_action.to_string(),
            reasoning: t.reasoning.to_string(),
        })
        .collect()
}
