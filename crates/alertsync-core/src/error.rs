//! Error types for alertsync

use thiserror::Error;

/// Result type alias using alertsync's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for alertsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx response from the Grafana API
    #[error("{} - {}", .status.as_u16(), .body)]
    Api {
        /// HTTP status code of the response
        status: reqwest::StatusCode,
        /// Response body text
        body: String,
    },

    /// Transport-level HTTP error (timeout, connection failure, decode)
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parse error
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Required field absent from an alert definition
    #[error("Missing required field '{0}' in alert definition")]
    MissingField(&'static str),

    /// Not found error
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up
        entity: String,
        /// Identifier or title that failed to resolve
        id: String,
    },
}

impl Error {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}
