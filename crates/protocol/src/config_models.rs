//! Global configuration models for `.careerflow/config.toml`.
//!
//! This module defines the client-side settings: where the pipeline backend
//! lives and how the offline simulation behaves.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Represents global settings from `.careerflow/config.toml`.
///
/// # Example
///
/// ```toml
/// # .careerflow/config.toml
/// api_base_url = "http://localhost:8000"
/// demo_mode = false
/// tick_interval_ms = 100
/// log_display_limit = 20
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct GlobalConfig {
    /// Base address of the pipeline backend, without a trailing slash.
    pub api_base_url: String,

    /// Always drive the pipeline with the local simulation.
    pub demo_mode: bool,

    /// Wall-clock length of one simulation tick.
    pub tick_interval_ms: u64,

    /// Maximum number of activity log lines shown at once.
    pub log_display_limit: usize,

    /// Seed for the simulation's metric jitter. Random when unset.
    pub seed: Option<u64>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            demo_mode: false,
            tick_interval_ms: 100,
            log_display_limit: 20,
            seed: None,
        }
    }
}
