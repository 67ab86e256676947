//! Base snapshots: the last content known to match on both sides
//!
//! Stored in the project under `.repo-sync/base/<path>`.

use recsync_fs::{RecordStore, SyncPath};

use crate::Result;

pub struct BaseSnapshots<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> BaseSnapshots<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    pub fn get(&self, path: &str) -> Result<Option<String>> {
        Ok(self.store.read_file(&SyncPath::base_of(path))?)
    }

    /// Record `content` as the base of `path`; `None` clears it.
    pub fn set(&self, path: &str, content: Option<&str>) -> Result<()> {
        let base = SyncPath::base_of(path);
        match content {
            Some(content) => self.store.write_file(&base, content)?,
            None => self.store.unlink(&base)?,
        }
        Ok(())
    }

    /// Every path that has a base snapshot, sorted.
    pub fn paths(&self) -> Result<Vec<String>> {
        let root = SyncPath::BaseDir.as_str();
        let mut paths = Vec::new();
        let mut pending = vec![String::new()];

        while let Some(dir) = pending.pop() {
            let listing = if dir.is_empty() {
                root.to_string()
            } else {
                format!("{root}/{dir}")
            };
            for entry in self.store.readdir(&listing)? {
                if entry.name.starts_with('.') && entry.name.ends_with(".tmp") {
                    continue;
                }
                let path = if dir.is_empty() {
                    entry.name
                } else {
                    format!("{dir}/{}", entry.name)
                };
                if entry.is_dir {
                    pending.push(path);
                } else {
                    paths.push(path);
                }
            }
        }

        paths.sort();
        Ok(paths)
    }
}
