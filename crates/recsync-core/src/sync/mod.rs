//! SyncCoordinator: one pull/merge/push cycle per call
//!
//! This module provides:
//! - **coordinator**: the cycle itself, plus operator conflict resolution
//! - **report**: [`SyncCycleResult`] and the [`SyncState`] machine states

mod coordinator;
mod report;

pub use coordinator::{Resolution, SyncCoordinator};
pub use report::{SyncCycleResult, SyncState};
