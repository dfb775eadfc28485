//! Error types for the revalidation hook
//!
//! None of these errors ever reach the content operation that triggered a
//! revalidation. They surface from constructors, from collaborators, and
//! inside the notifier where they are classified and logged.

use thiserror::Error;

/// Result type alias for revalidation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the revalidation hook
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint URL or shared secret is not set (expected on fresh installs)
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host could not answer a post or term lookup
    #[error("Content lookup error: {0}")]
    ContentLookup(String),

    /// The HTTP call never completed (connect, DNS, timeout, redirect limit)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The HTTP call completed with a non-2xx status
    #[error("HTTP status code {status}")]
    RemoteRejection {
        /// Status code returned by the front-end
        status: u16,
    },

    /// I/O errors (option files, stdin)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "configuration missing" error
    pub fn configuration_missing(msg: impl Into<String>) -> Self {
        Self::ConfigurationMissing(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a content lookup error
    pub fn content_lookup(msg: impl Into<String>) -> Self {
        Self::ContentLookup(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a remote rejection error
    pub fn remote_rejection(status: u16) -> Self {
        Self::RemoteRejection { status }
    }

    /// Whether this error means "nothing to do" rather than a fault
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, Self::ConfigurationMissing(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_rejection_message_carries_status() {
        let err = Error::remote_rejection(503);
        assert_eq!(err.to_string(), "HTTP status code 503");
    }

    #[test]
    fn configuration_missing_is_not_a_fault() {
        assert!(Error::configuration_missing("nextjs_url").is_configuration_missing());
        assert!(!Error::transport("connection refused").is_configuration_missing());
    }
}
