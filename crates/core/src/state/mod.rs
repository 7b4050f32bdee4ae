//! Pipeline session state.
//!
//! This module provides:
//! - The pure event reducer
//! - WorkflowStateStore holding the live session and its subscribers
//! - SessionManager coordinating the store with the active source

pub mod manager;
pub mod reducer;
pub mod store;

pub use manager::SessionManager;
pub use reducer::reduce;
pub use store::{Subscription, WorkflowStateStore};
