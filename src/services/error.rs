//! Error types for the remote services

use thiserror::Error;

/// Failure talking to the card catalog
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure talking to the auth/data backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend is not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Constraint violations, row-level denials, bad credentials
    #[error("{message} ({status})")]
    Rejected { status: u16, message: String },

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("You need to sign in first")]
    NoSession,
}

impl BackendError {
    /// True when the backend refused the request's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Rejected { status: 401 | 403, .. })
    }
}
