//! Configuration models that aggregate all settings.
//!
//! `AppConfig` combines the global settings with the simulated agent table
//! into a single configuration object.

use crate::simulation::templates::default_agents;
use cf_protocol::agent_models::SimulatedAgent;
use cf_protocol::config_models::GlobalConfig;

/// Environment variable that overrides `api_base_url`.
pub const API_BASE_ENV: &str = "CAREERFLOW_API_BASE";

/// Unified application configuration loaded from the `.careerflow/` directory.
///
/// # Example
///
/// ```rust,no_run
/// use cf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Backend at {} with {} simulated agents",
///          config.global.api_base_url,
///          config.agents.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// Simulated pipeline steps from `agents/*.md`, in execution order.
    pub agents: Vec<SimulatedAgent>,
}

impl AppConfig {
    /// Base URL with any trailing slash removed.
    pub fn api_base_url(&self) -> &str {
        self.global.api_base_url.trim_end_matches('/')
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            agents: default_agents(),
        }
    }
}
