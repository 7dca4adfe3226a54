//! Client side of the backend's REST API

mod client;
pub mod types;

pub use client::ApiClient;
