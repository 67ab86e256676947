//! Persistence of the conflict map
//!
//! The map lives in the project at `.repo-sync/conflicts.json` and is read
//! and written through the project's [`RecordStore`].

use recsync_fs::{RecordStore, SyncPath};

use super::ConflictState;
use crate::{Error, Result};

/// Loads and saves the [`ConflictState`] of one project
pub struct ConflictStore<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> ConflictStore<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Load the state, empty if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not decode.
    pub fn load(&self) -> Result<ConflictState> {
        let path = SyncPath::ConflictsFile.as_str();
        match self.store.read_file(path)? {
            None => Ok(ConflictState::new()),
            Some(text) if text.trim().is_empty() => Ok(ConflictState::new()),
            Some(text) => serde_json::from_str(&text).map_err(|e| Error::CorruptState {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    pub fn save(&self, state: &ConflictState) -> Result<()> {
        let mut text = serde_json::to_string_pretty(state)?;
        text.push('\n');
        self.store
            .write_file(SyncPath::ConflictsFile.as_str(), &text)?;
        tracing::debug!(conflicts = state.conflicts.len(), "Saved conflict state");
        Ok(())
    }
}
