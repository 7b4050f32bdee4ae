//! Offline pipeline simulation.
//!
//! Produces the same event sequence a live backend would, driven by a local
//! timer instead of the network.

pub mod driver;
pub mod engine;
pub mod templates;

pub use driver::{SimulationCommand, SimulationHandle};
pub use engine::{AgentProgress, SimulatedWorkflowEngine, SimulationSnapshot};
