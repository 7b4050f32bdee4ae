//! Errors raised while reading `.careerflow/`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `config.toml` is not valid TOML or has fields of the wrong type.
    #[error("Bad settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Agent front matter is missing required fields or has the wrong types.
    #[error("Bad agent fields in {path}: {source}")]
    AgentFields {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// An agent file without a `---` front matter block.
    #[error("Agent file {path} is unusable: {reason}")]
    AgentFile { path: PathBuf, reason: String },

    #[error("Cannot list agents under {path}: {source}")]
    AgentsDir {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// A value parsed but cannot drive a pipeline, such as a zero tick.
    #[error("Out-of-range value in {path}: {reason}")]
    OutOfRange { path: PathBuf, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
