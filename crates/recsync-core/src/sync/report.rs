//! Cycle states and the cycle report

use std::fmt;

use recsync_remote::PushResult;
use serde::{Deserialize, Serialize};

/// States of one sync cycle, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Idle,
    EnsuringAdapter,
    Pulling,
    BuildingTriples,
    Merging,
    Clean,
    HasConflicts,
    Pushing,
    Done,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::EnsuringAdapter => "ensuring adapter",
            Self::Pulling => "pulling",
            Self::BuildingTriples => "building triples",
            Self::Merging => "merging",
            Self::Clean => "clean",
            Self::HasConflicts => "has conflicts",
            Self::Pushing => "pushing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Report from one sync cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCycleResult {
    /// Paths that merged cleanly this cycle
    pub resolved: Vec<String>,
    /// Conflict keys produced this cycle
    pub conflicts: Vec<String>,
    /// The remote has no head revision or no files yet
    pub needs_init: bool,
    /// Per-path push outcomes; `None` when nothing was pushed
    pub push_results: Option<Vec<PushResult>>,
    /// Why the cycle stopped early, if it did
    pub aborted: Option<String>,
    /// The state the cycle ended in
    pub state: SyncState,
    pub head_sha: Option<String>,
    /// Paths whose local file was rewritten or removed by the merge
    pub applied: Vec<String>,
}

impl SyncCycleResult {
    /// A cycle that did nothing because no remote is configured.
    pub fn no_op() -> Self {
        Self {
            resolved: Vec::new(),
            conflicts: Vec::new(),
            needs_init: false,
            push_results: None,
            aborted: None,
            state: SyncState::Idle,
            head_sha: None,
            applied: Vec::new(),
        }
    }

    /// A cycle stopped in `state`; `conflicts` are the already persisted keys.
    pub fn aborted(state: SyncState, reason: impl Into<String>, conflicts: Vec<String>) -> Self {
        Self {
            conflicts,
            aborted: Some(reason.into()),
            state,
            ..Self::no_op()
        }
    }

    pub fn is_no_op(&self) -> bool {
        self.state == SyncState::Idle
    }

    pub fn is_clean(&self) -> bool {
        self.aborted.is_none() && self.conflicts.is_empty()
    }

    /// Paths that were published successfully.
    pub fn pushed(&self) -> Vec<&str> {
        self.push_results
            .iter()
            .flatten()
            .filter(|r| r.ok)
            .map(|r| r.path.as_str())
            .collect()
    }

    /// Push outcomes that failed.
    pub fn failed_pushes(&self) -> Vec<&PushResult> {
        self.push_results
            .iter()
            .flatten()
            .filter(|r| !r.ok)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_remote::PushFailure;

    #[test]
    fn pushed_and_failed_partition_results() {
        let result = SyncCycleResult {
            push_results: Some(vec![
                PushResult::success("a.json"),
                PushResult::failed("b.json", PushFailure::Conflict, "409"),
            ]),
            state: SyncState::Done,
            ..SyncCycleResult::no_op()
        };
        assert_eq!(result.pushed(), vec!["a.json"]);
        assert_eq!(result.failed_pushes()[0].path, "b.json");
        assert!(result.is_clean());
    }

    #[test]
    fn aborted_cycle_is_not_clean() {
        let result = SyncCycleResult::aborted(SyncState::Pulling, "offline", vec![]);
        assert!(!result.is_clean());
        assert!(!result.is_no_op());
    }
}
