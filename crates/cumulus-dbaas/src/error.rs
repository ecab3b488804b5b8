//! Error types for the Cumulus base client.

use thiserror::Error;

/// Base error type for DBaaS client operations.
#[derive(Error, Debug)]
pub enum DbaasError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Control plane returned {status}: {message}")]
    ControlPlane { status: u16, message: String },

    #[error("Control plane request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbaasError {
    /// Status code of a platform-reported failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DbaasError::ControlPlane { status, .. } => Some(*status),
            DbaasError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the platform reported that the database does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type alias for base client operations.
pub type Result<T> = std::result::Result<T, DbaasError>;
