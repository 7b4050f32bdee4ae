//! Simulated agent models for `.careerflow/agents/*.md`.
//!
//! Each file describes one step of the offline simulation: how long it takes
//! and the log entry it produces when it finishes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One agent of the simulated pipeline.
///
/// Agents are defined in Markdown files with YAML front matter; the file body
/// becomes the reasoning text of the synthesized log entry.
///
/// # Example
///
/// ```markdown
/// ---
/// name: Matching Engine
/// duration: 5
/// order: 3
/// task: Scored 23 new positions against profile
/// tools: [Scoring Algorithm, ATS Simulator]
/// confidence: 91
/// next-action: Queue top 8 for personalization
/// ---
///
/// Applied ATS keyword optimization, weighted location preference and salary range
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct SimulatedAgent {
    /// Step name shown in the workflow.
    pub name: String,

    /// Nominal run time in seconds.
    pub duration: f64,

    /// Position in the pipeline; ties are broken by file name.
    #[serde(default)]
    pub order: u32,

    #[serde(default)]
    pub task: String,

    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub confidence: u32,

    #[serde(default)]
    pub next_action: String,

    /// Body of the .md file.
    #[serde(skip)]
    pub reasoning: String,
}
