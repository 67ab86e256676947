//! Error types for recsync-content

use crate::format::Format;

/// Result type for recsync-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in recsync-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Unparsable(#[from] Unparsable),

    #[error("Failed to render {format} content: {message}")]
    Render { format: Format, message: String },
}

/// Content that could not be decoded in its declared format.
///
/// Never propagated as a failure by the merge path: an unparsable side of a
/// triple turns the whole file into a conflict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to parse {format} content: {message}")]
pub struct Unparsable {
    pub format: Format,
    pub message: String,
}

impl Unparsable {
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
        }
    }
}

impl Error {
    pub fn render(format: Format, message: impl Into<String>) -> Self {
        Self::Render {
            format,
            message: message.into(),
        }
    }
}
