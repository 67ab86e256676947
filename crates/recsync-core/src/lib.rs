//! Sync engine for recsync
//!
//! This crate turns the merge primitives of `recsync-content` into a
//! synchronization protocol:
//!
//! - **ThreewaySession**: merge a batch of file triples into resolved paths
//!   and conflict records ([`run_threeway`])
//! - **Conflict tracking**: records, timestamp reconciliation, and the
//!   persisted conflict map ([`ConflictState`], [`ConflictStore`])
//! - **DispatchShim**: run a session on a worker raced against a timeout
//! - **SyncCoordinator**: one pull/merge/push cycle for a project
//!
//! # Architecture
//!
//! ```text
//!                  recsync-cli
//!                       |
//!                  recsync-core
//!                       |
//!      +----------------+----------------+
//!      |                |                |
//! recsync-fs    recsync-content   recsync-remote
//! ```

pub mod base;
pub mod conflict;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod settings;
pub mod sync;
pub mod triple;

pub use base::BaseSnapshots;
pub use conflict::{
    ConflictCause, ConflictMap, ConflictRecord, ConflictState, ConflictStore, reconcile, record,
};
pub use dispatch::{DispatchPath, DispatchShim, Dispatched};
pub use error::{Error, Result};
pub use session::{SessionOutcome, run_threeway};
pub use settings::SyncSettings;
pub use sync::{Resolution, SyncCoordinator, SyncCycleResult, SyncState};
pub use triple::FileTriple;
