//! # cf-core
//!
//! Pipeline workflow engine for the careerflow client.
//!
//! This crate provides:
//! - Configuration loading from the `.careerflow/` directory
//! - CV upload and the server-sent event stream client
//! - A pure reducer and store holding the single live pipeline session
//! - An offline simulation producing the same event sequence
//! - The activity log projection used by renderers
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`client`]: Backend HTTP endpoints and the event stream
//! - [`simulation`]: Simulated pipeline engine and its timer driver
//! - [`source`]: The `WorkflowSource` capability shared by live and simulated runs
//! - [`state`]: Reducer, store and session manager
//! - [`projection`]: Display-ready activity log

pub mod client;
pub mod config;
pub mod error;
pub mod projection;
pub mod simulation;
pub mod source;
pub mod state;

pub use error::{WorkflowError, WorkflowResult};
