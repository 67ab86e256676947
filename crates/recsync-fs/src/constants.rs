//! Reserved paths inside a record project.
//!
//! Everything under the [`RESERVED_PREFIX`] belongs to the sync engine and is
//! never treated as a record: it is skipped when listing records and refused
//! by the remote publisher.

use std::path::Path;

/// Prefix shared by every internal metadata entry at the project root.
pub const RESERVED_PREFIX: &str = ".repo-";

/// Well-known internal paths, relative to the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPath {
    /// The `.repo-sync` directory holding all sync metadata
    MetaDir,
    /// Base snapshots, mirrored by record path
    BaseDir,
    /// Persisted conflict map and resolved history
    ConflictsFile,
    /// Remote adapter descriptor
    AdapterFile,
    /// Optional sync tunables
    SettingsFile,
}

impl SyncPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaDir => ".repo-sync",
            Self::BaseDir => ".repo-sync/base",
            Self::ConflictsFile => ".repo-sync/conflicts.json",
            Self::AdapterFile => ".repo-sync/adapter.json",
            Self::SettingsFile => ".repo-sync/settings.toml",
        }
    }

    /// Location of the base snapshot for a record path.
    pub fn base_of(record_path: &str) -> String {
        format!("{}/{}", Self::BaseDir.as_str(), record_path)
    }
}

impl AsRef<Path> for SyncPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for SyncPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SyncPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a record-relative path falls under the reserved metadata prefix.
pub fn is_reserved(path: &str) -> bool {
    path.trim_start_matches("./").starts_with(RESERVED_PREFIX)
}
