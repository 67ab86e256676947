//! [`TestProject`] builder for sync scenarios.

use std::fs;
use std::path::Path;

use recsync_fs::{DirStore, SyncPath};
use tempfile::TempDir;

/// A temporary project directory with helpers for arranging records and
/// base snapshots and asserting on the result.
///
/// # Example
///
/// ```rust,no_run
/// use recsync_test_utils::TestProject;
///
/// let project = TestProject::new()
///     .with_file("a.json", "{\"v\": 2}\n")
///     .with_base("a.json", "{\"v\": 1}\n");
/// project.assert_file_contains("a.json", "\"v\": 2");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A [`DirStore`] over this project.
    pub fn store(&self) -> DirStore {
        DirStore::new(self.root())
    }

    /// Write a record file, creating parent directories.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.write(path, content);
        self
    }

    /// Write the base snapshot of a record.
    pub fn with_base(self, path: &str, content: &str) -> Self {
        self.write(&SyncPath::base_of(path), content);
        self
    }

    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Read a file relative to the root, `None` if it does not exist.
    pub fn read(&self, path: &str) -> Option<String> {
        fs::read_to_string(self.root().join(path)).ok()
    }

    /// Read the base snapshot of a record.
    pub fn base(&self, path: &str) -> Option<String> {
        self.read(&SyncPath::base_of(path))
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
