//! Pipeline result and HTTP response models.
//!
//! Every field defaults to an empty value so a partially filled result from the
//! server still deserializes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
#[serde(default)]
pub struct DetectedRole {
    pub primary_role: String,
    pub secondary_roles: Vec<String>,
    pub seniority: String,
    pub location: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
#[serde(default)]
pub struct MatchedJob {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub match_score: f64,
    pub url: String,
    pub salary: String,
}

/// Qualitative bucket of a match score, as the dashboard colors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Strong,
    Fair,
    Weak,
}

impl MatchedJob {
    pub fn tier(&self) -> MatchTier {
        if self.match_score >= 80.0 {
            MatchTier::Strong
        } else if self.match_score >= 60.0 {
            MatchTier::Fair
        } else {
            MatchTier::Weak
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
#[serde(default)]
pub struct Application {
    pub title: String,
    pub company: String,
    pub match_score: f64,
    pub cover_letter: String,
    pub status: String,
    pub url: String,
}

/// Payload of `pipeline_complete`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
#[serde(default)]
pub struct PipelineResult {
    pub profile: Profile,
    pub detected_role: DetectedRole,
    pub matched_jobs: Vec<MatchedJob>,
    pub applications: Vec<Application>,
    /// Raw server-side log list, kept as-is.
    #[ts(type = "unknown[]")]
    pub logs: Vec<serde_json::Value>,
}

/// Profile summary returned by `POST /api/upload`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
#[serde(default)]
pub struct UploadProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub skill_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub profile: UploadProfile,
}

/// Error body of a failed HTTP call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Response of `GET /health`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub demo_mode: bool,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Response of `GET /api/status/{session_id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct SessionStatus {
    pub session_id: String,
    pub status: String,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<PipelineResult>,
}
