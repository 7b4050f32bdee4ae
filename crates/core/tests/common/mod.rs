//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Event fixtures (scenario sequences, logs, results)
//! - Invariant assertions over session states
//! - Temporary `.careerflow/` projects

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
