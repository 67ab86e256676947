//! The record store capability consumed by the sync engine.
//!
//! The engine never touches the filesystem directly: it is handed a
//! [`RecordStore`] for the project it syncs. [`DirStore`] is the on-disk
//! implementation, rooted at a project directory.

use std::fs;
use std::io::ErrorKind;

use serde::{Deserialize, Serialize};

use crate::constants::{SyncPath, is_reserved};
use crate::{ConfigStore, Error, NormalizedPath, Result, io, validate_record_path};

/// Provider adapter descriptor stored alongside a project.
///
/// `kind` names the provider (`github` or `gitlab`); `opts` carries the
/// provider-specific options exactly as they were configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterMeta {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub opts: serde_json::Map<String, serde_json::Value>,
}

impl AdapterMeta {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            opts: serde_json::Map::new(),
        }
    }

    /// Builder-style option setter; `None` values are skipped.
    pub fn with_opt(mut self, key: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.opts
                .insert(key.to_string(), serde_json::Value::String(value.into()));
        }
        self
    }

    /// String option lookup; empty strings read as absent.
    pub fn opt(&self, key: &str) -> Option<&str> {
        self.opts
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// One entry returned by [`RecordStore::readdir`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read/write access to the files of one project.
///
/// Paths are project-relative and use forward slashes. Reads of missing
/// files return `Ok(None)`; errors are reserved for a store that cannot be
/// accessed at all.
pub trait RecordStore: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Option<String>>;

    fn write_file(&self, path: &str, content: &str) -> Result<()>;

    /// List a directory; `""` is the project root. A missing directory is empty.
    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Remove a file. Removing a missing file succeeds.
    fn unlink(&self, path: &str) -> Result<()>;

    fn get_adapter(&self) -> Result<Option<AdapterMeta>>;

    fn set_adapter(&self, meta: &AdapterMeta) -> Result<()>;

    /// Every record path in the project, sorted, excluding reserved metadata.
    fn list_records(&self) -> Result<Vec<String>> {
        let mut records = Vec::new();
        let mut pending = vec![String::new()];

        while let Some(dir) = pending.pop() {
            for entry in self.readdir(&dir)? {
                let path = if dir.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}/{}", dir, entry.name)
                };
                if is_reserved(&path) || is_temp_file(&entry.name) {
                    continue;
                }
                if entry.is_dir {
                    pending.push(path);
                } else {
                    records.push(path);
                }
            }
        }

        records.sort();
        Ok(records)
    }
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

/// A [`RecordStore`] backed by a project directory on disk.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: NormalizedPath,
    config: ConfigStore,
}

impl DirStore {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self {
            root: root.into(),
            config: ConfigStore::new(),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<NormalizedPath> {
        let relative = validate_record_path(path)?;
        Ok(self.root.join(&relative))
    }

    fn adapter_path(&self) -> NormalizedPath {
        self.root.join(SyncPath::AdapterFile.as_str())
    }
}

impl RecordStore for DirStore {
    fn read_file(&self, path: &str) -> Result<Option<String>> {
        io::read_text_opt(&self.resolve(path)?)
    }

    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let target = self.resolve(path)?;
        tracing::debug!(path = %path, bytes = content.len(), "Writing record");
        io::write_text(&target, content)
    }

    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let dir = if path.is_empty() || path == "." {
            self.root.clone()
        } else {
            self.resolve(path)?
        };

        let native = dir.to_native();
        let read = match fs::read_dir(&native) {
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&native, e)),
        };

        let mut entries = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn unlink(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        tracing::debug!(path = %path, "Removing record");
        io::remove_file(&target)
    }

    fn get_adapter(&self) -> Result<Option<AdapterMeta>> {
        self.config.load_optional(&self.adapter_path())
    }

    fn set_adapter(&self, meta: &AdapterMeta) -> Result<()> {
        tracing::info!(provider = %meta.kind, "Storing remote adapter");
        self.config.save(&self.adapter_path(), meta)
    }
}
