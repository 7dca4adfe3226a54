//! Returns smoke test - end-to-end checks for an e-commerce returns backend
//!
//! This library drives the returns, refunds and warranties REST API as a
//! client, a manager and an admin at once, and verifies each state change.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod session;
pub mod workflow;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use session::Role;
