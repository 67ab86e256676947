//! Engine tunables
//!
//! Loaded from the optional `.repo-sync/settings.toml` of a project:
//!
//! ```toml
//! dispatch_timeout_ms = 2000
//!
//! [retry]
//! initial_delay_ms = 200
//! branch_attempts = 2
//! read_attempts = 2
//! write_attempts = 3
//! precondition_attempts = 2
//! ```

use std::time::Duration;

use recsync_fs::{RecordStore, SyncPath};
use recsync_remote::RetryBudget;
use recsync_remote::retry::millis;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// How long the merge worker may run before the session runs inline
    #[serde(rename = "dispatch_timeout_ms", with = "millis")]
    pub dispatch_timeout: Duration,
    pub retry: RetryBudget,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            dispatch_timeout: Duration::from_secs(2),
            retry: RetryBudget::default(),
        }
    }
}

impl SyncSettings {
    /// Load the project settings, defaults when the file is absent.
    pub fn load(store: &dyn RecordStore) -> Result<Self> {
        let path = SyncPath::SettingsFile.as_str();
        match store.read_file(path)? {
            None => Ok(Self::default()),
            Some(text) => toml::from_str(&text).map_err(|e| Error::Settings {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Settings {
            path: SyncPath::SettingsFile.as_str().to_string(),
            message: e.to_string(),
        })
    }
}
