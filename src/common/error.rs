//! Error types for the smoke tester
//!
//! Messages name the endpoint and status involved so a failed run can be
//! diagnosed from the console output alone.

use thiserror::Error;

use crate::session::Role;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the smoke tester
#[derive(Error, Debug)]
pub enum Error {
    // === HTTP Errors ===
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {endpoint} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response body from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === Workflow Errors ===
    #[error("Not logged in as {0}. Run the login step for this role first")]
    NotAuthenticated(Role),

    #[error("'{0}' is not set yet; an earlier step must produce it")]
    MissingState(&'static str),

    #[error("No products available in the catalogue")]
    NoProducts,

    #[error("No order available to return: {0}")]
    NoEligibleOrder(#[source] Box<Error>),

    #[error("Check failed: {0}")]
    Assertion(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create an unexpected status error
    pub fn unexpected_status(method: &str, endpoint: &str, status: u16, body: String) -> Self {
        Self::UnexpectedStatus {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status,
            body,
        }
    }

    /// Create a decode error
    pub fn decode(endpoint: &str, reason: impl ToString) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::NoEligibleOrder(inner) => inner.http_status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_message() {
        let err = Error::unexpected_status("POST", "token/", 401, "{\"detail\":\"nope\"}".into());
        assert_eq!(err.http_status(), Some(401));
        let msg = err.to_string();
        assert!(msg.contains("POST token/"));
        assert!(msg.contains("401"));
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        assert_eq!(Error::NoProducts.http_status(), None);
        assert_eq!(Error::MissingState("order_id").http_status(), None);
    }

    #[test]
    fn test_no_eligible_order_keeps_cause() {
        let cause = Error::unexpected_status("POST", "orders/", 400, "{}".into());
        let err = Error::NoEligibleOrder(Box::new(cause));
        assert_eq!(err.http_status(), Some(400));
        assert!(err.to_string().contains("POST orders/ returned HTTP 400"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
