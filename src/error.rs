//! Error types for checkpoint
//!
//! All modules use `CheckResult<T>` as their return type.

use thiserror::Error;

/// Result type alias for checkpoint operations
pub type CheckResult<T> = Result<T, CheckError>;

/// All errors that can occur while checking for updates
#[derive(Error, Debug)]
pub enum CheckError {
    // Input errors
    #[error("Invalid check parameters: {0}")]
    Validation(String),

    // Endpoint errors
    #[error("Update check request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid endpoint URL {url}: {reason}")]
    Endpoint { url: String, reason: String },

    // Serialization errors
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a request URL
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure happened talking to the remote endpoint.
    ///
    /// Callers holding a previous response usually keep it on these.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Network { .. } => {
                Some("Check your connection, or set CHECKPOINT_DISABLE=1 to skip update checks")
            }
            Self::Endpoint { .. } => Some("Check the value of CHECKPOINT_URL"),
            Self::Decode(_) => Some("Delete the cache file if it was edited by hand"),
            _ => None,
        }
    }
}
