//! Project root detection
//!
//! Commands run against the nearest directory holding a `.repo-sync`
//! folder, so they work from anywhere inside a synced project.

use std::path::{Path, PathBuf};

use recsync_fs::SyncPath;

/// Where a command operates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub root: PathBuf,
    /// Whether `.repo-sync` already exists at `root`
    pub initialized: bool,
}

/// Find the project containing `start`.
///
/// Walks up looking for `.repo-sync`. When none is found, `start` itself
/// is the root of a project that has never been synced.
pub fn detect_project(start: &Path) -> ProjectContext {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(SyncPath::MetaDir.as_str()).is_dir() {
            return ProjectContext {
                root: dir.to_path_buf(),
                initialized: true,
            };
        }
        current = dir.parent();
    }
    ProjectContext {
        root: start.to_path_buf(),
        initialized: false,
    }
}
