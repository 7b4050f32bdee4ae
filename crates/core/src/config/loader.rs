//! Configuration file loader for the `.careerflow/` directory structure.
//!
//! This module loads and parses the client configuration:
//! - `config.toml`: Global settings (backend address, simulation tuning)
//! - `agents/*.md`: Simulated agent definitions with YAML front matter
//!
//! The backend address can additionally be overridden through the
//! `CAREERFLOW_API_BASE` environment variable.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AppConfig, API_BASE_ENV};
use crate::simulation::templates::default_agents;
use cf_protocol::agent_models::SimulatedAgent;
use cf_protocol::config_models::GlobalConfig;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".careerflow";

/// Loads all configuration from the `.careerflow/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.careerflow/` folder
///
/// # Returns
///
/// An `AppConfig`. Missing directories or files fall back to the defaults:
/// the standard backend address and the built-in simulated agents.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML or Markdown front matter)
/// - Values are out of range (zero tick interval, non-positive or infinite durations)
///
/// # Example
///
/// ```rust,no_run
/// use cf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} simulated agents", config.agents.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let cf_dir = root.join(CONFIG_DIR);

    let mut config = if cf_dir.exists() {
        AppConfig {
            global: load_global_config(&cf_dir)?,
            agents: load_agents(&cf_dir)?,
        }
    } else {
        debug!(path = %cf_dir.display(), "No configuration directory, using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut config.global, |key| std::env::var(key).ok());

    Ok(config)
}

/// Applies environment overrides using the given lookup.
pub fn apply_env_overrides<F>(global: &mut GlobalConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = lookup(API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
        debug!(api_base_url = %base, "API base overridden from environment");
        global.api_base_url = base.trim().to_string();
    }
}

/// Loads global configuration from `config.toml`.
fn load_global_config(cf_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = cf_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::Settings {
            path: config_path.clone(),
            source,
        })?;

    if config.tick_interval_ms == 0 {
        return Err(ConfigError::OutOfRange {
            path: config_path,
            reason: "tick_interval_ms must be greater than zero".to_string(),
        });
    }

    Ok(config)
}

/// Loads simulated agent definitions from `agents/*.md`.
///
/// An absent or empty directory yields the built-in agents.
fn load_agents(cf_dir: &Path) -> ConfigResult<Vec<SimulatedAgent>> {
    let agents_dir = cf_dir.join("agents");

    if !agents_dir.exists() {
        return Ok(default_agents());
    }

    let mut agents: Vec<(PathBuf, SimulatedAgent)> = Vec::new();

    for entry in WalkDir::new(&agents_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
    {
        let entry = entry.map_err(|source| ConfigError::AgentsDir {
            path: agents_dir.clone(),
            source,
        })?;

        let path = entry.path();

        // Only process .md files
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let agent = parse_agent_file(path)?;
        agents.push((path.to_path_buf(), agent));
    }

    if agents.is_empty() {
        debug!(path = %agents_dir.display(), "No agent files, using built-in agents");
        return Ok(default_agents());
    }

    agents.sort_by(|(a_path, a), (b_path, b)| a.order.cmp(&b.order).then_with(|| a_path.cmp(b_path)));

    Ok(agents.into_iter().map(|(_, agent)| agent).collect())
}

fn parse_agent_file(path: &Path) -> ConfigResult<SimulatedAgent> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // Parse Markdown with YAML front matter
    let matter = Matter::<YAML>::new();
    let result = matter.parse(&content);

    if result.matter.trim().is_empty() {
        return Err(ConfigError::AgentFile {
            path: path.to_path_buf(),
            reason: "Missing YAML front matter".to_string(),
        });
    }

    let mut agent: SimulatedAgent =
        serde_yaml::from_str(&result.matter).map_err(|source| ConfigError::AgentFields {
            path: path.to_path_buf(),
            source,
        })?;

    if !agent.duration.is_finite() || agent.duration <= 0.0 {
        return Err(ConfigError::OutOfRange {
            path: path.to_path_buf(),
            reason: format!("agent '{}' must have a finite, positive duration", agent.name),
        });
    }

    // The markdown body is the reasoning line of the synthesized log
    agent.reasoning = result.content.trim().to_string();

    Ok(agent)
}
