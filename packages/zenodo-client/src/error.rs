//! Error types for the Zenodo client.

use thiserror::Error;

/// Result type for Zenodo client operations.
pub type Result<T> = std::result::Result<T, ZenodoError>;

/// Zenodo client errors.
#[derive(Debug, Error)]
pub enum ZenodoError {
    /// Non-2xx response
    #[error("Zenodo API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure (connection, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file could not be read for upload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Publish succeeded but the response carried no DOI
    #[error("deposition {0} was published without a DOI")]
    MissingDoi(u64),
}

impl ZenodoError {
    /// Whether the failure is transient: rate limiting, a server error, or
    /// a connection-level problem.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Io(_) | Self::MissingDoi(_) => false,
        }
    }
}
