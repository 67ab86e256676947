//! Error types for recsync-core

/// Result type for recsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in recsync-core operations
///
/// Conflicts and push failures are data, not errors: they are reported in
/// [`crate::SyncCycleResult`]. Errors are reserved for a project that
/// cannot be read or written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No conflict is recorded under the given key
    #[error("No conflict recorded under '{key}'")]
    ConflictNotFound { key: String },

    /// The persisted conflict state could not be decoded
    #[error("Conflict state at {path} is corrupt: {message}")]
    CorruptState { path: String, message: String },

    /// The settings file could not be decoded
    #[error("Invalid settings in {path}: {message}")]
    Settings { path: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from recsync-fs
    #[error(transparent)]
    Fs(#[from] recsync_fs::Error),

    /// Content error from recsync-content
    #[error(transparent)]
    Content(#[from] recsync_content::Error),

    /// Remote error from recsync-remote
    #[error(transparent)]
    Remote(#[from] recsync_remote::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
