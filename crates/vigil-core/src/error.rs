//! Error types for Vigil

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for Vigil
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Probe execution error
    #[error("Probe '{name}' failed: {message}")]
    Probe {
        /// Probe name
        name: String,
        /// Error message
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// Generic error with context
    #[error("{0}")]
    Generic(String),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Probe { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a probe error
    pub fn probe(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Probe {
            name: name.into(),
            message: message.into(),
        }
    }
}
