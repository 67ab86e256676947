//! [`MemoryRemote`]: a remote branch held in memory.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use recsync_remote::{Error, RemoteFile, RemoteFileListing, RemoteSource, RepoConfig, Result};

/// In-memory [`RemoteSource`] for coordinator tests.
#[derive(Default)]
pub struct MemoryRemote {
    files: Mutex<BTreeMap<String, String>>,
    head: Mutex<Option<String>>,
    failure: Mutex<Option<String>>,
}

impl MemoryRemote {
    /// An initialized branch with no files.
    pub fn new() -> Self {
        let remote = Self::default();
        *remote.head.lock().unwrap() = Some("head1".to_string());
        remote
    }

    /// A remote whose branch does not exist yet.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.set_file(path, content);
        self
    }

    pub fn set_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn remove_file(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Make every subsequent fetch fail with a network error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(Error::network("memory://remote", message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteSource for MemoryRemote {
    async fn fetch_tree(&self, _config: &RepoConfig) -> Result<RemoteFileListing> {
        self.check()?;
        let head = self.head.lock().unwrap().clone();
        if head.is_none() {
            return Ok(RemoteFileListing::default());
        }
        let files = self
            .files
            .lock()
            .unwrap()
            .keys()
            .enumerate()
            .map(|(i, path)| RemoteFile {
                path: path.clone(),
                sha: format!("blob{i}"),
            })
            .collect();
        Ok(RemoteFileListing {
            head_sha: head,
            files,
        })
    }

    async fn fetch_file(&self, _config: &RepoConfig, path: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.file(path))
    }
}
