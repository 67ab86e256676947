//! Error types for recsync-remote

/// Result type for recsync-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a remote provider
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Unexpected response from {url}: {status} {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("Invalid remote configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
