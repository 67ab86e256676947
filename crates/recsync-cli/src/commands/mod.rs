//! Command implementations for recsync-cli

pub mod config;
pub mod merge;
pub mod resolve;
pub mod show;
pub mod status;
pub mod sync;

pub use config::{run_config_set, run_config_show};
pub use merge::run_merge;
pub use resolve::run_resolve;
pub use show::run_show;
pub use status::run_status;
pub use sync::{run_push, run_sync};

use std::path::Path;
use std::sync::Arc;

use recsync_core::{SyncCoordinator, SyncSettings};
use recsync_fs::DirStore;
use recsync_remote::ReqwestTransport;

use crate::error::Result;

/// A coordinator for the project at `root`, talking to the real provider.
pub(crate) fn coordinator(root: &Path) -> Result<SyncCoordinator> {
    let store = Arc::new(DirStore::new(root));
    let settings = SyncSettings::load(store.as_ref())?;
    let transport = Arc::new(ReqwestTransport::new()?);
    Ok(SyncCoordinator::over_http(store, transport, settings))
}
