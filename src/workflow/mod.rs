//! Returns workflow
//!
//! Reads a YAML scenario and drives the backend through the full return
//! lifecycle, asserting on the structured responses rather than on text.

pub mod report;
mod runner;
mod scenario;
mod state;

pub use runner::{pick_order, run_workflow, RunOptions, RunReport};
pub use scenario::*;
pub use state::WorkflowState;
