//! Configuration loading and management.
//!
//! This module loads and parses the client configuration from the
//! `.careerflow/` directory structure.

pub mod error;
pub mod loader;
pub mod models;
