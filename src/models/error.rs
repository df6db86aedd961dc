//! Error types for the connector

use thiserror::Error;

/// Connector errors
///
/// These cover internal plumbing only. Hub absence is not an error
/// (standalone mode), and peer-call failures are reported to callers
/// through `CallOutcome`, never through this type.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Hub error: {0}")]
    Hub(String),
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        ConnectorError::Network(err.to_string())
    }
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
