//! # cf-protocol
//!
//! Protocol definitions and data models for careerflow.
//!
//! This crate defines the shared data structures used for:
//! - The pipeline event stream (server-sent or simulated)
//! - The workflow session state renderers consume
//! - Pipeline results and HTTP response bodies
//! - Configuration file parsing (TOML config, Markdown agents)
//!
//! ## Modules
//!
//! - [`event_models`]: The five pipeline events and their payloads
//! - [`session_models`]: Steps, log entries and the session state
//! - [`result_models`]: Pipeline result, upload/health/status responses
//! - [`config_models`]: Global configuration from config.toml
//! - [`agent_models`]: Simulated agent definitions
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, chrono and thiserror
//! - TypeScript generation: all types derive `TS` for the dashboard
//! - Independent compilation: no dependencies on other careerflow crates

pub mod agent_models;
pub mod config_models;
pub mod event_models;
pub mod result_models;
pub mod session_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use event_models::*;
pub use result_models::*;
pub use session_models::*;
