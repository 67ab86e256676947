//! SyncCoordinator implementation
//!
//! The coordinator owns nothing but handles: the project's record store,
//! a remote source to pull from, and a publisher to push with. Running two
//! cycles for the same project concurrently is the caller's responsibility
//! to avoid.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use recsync_fs::{RecordStore, is_reserved, validate_record_path};
use recsync_remote::{
    HttpRemote, PushFile, PushResult, RemoteFileListing, RemotePublisher, RemoteSource,
    RepoConfig, Transport,
};
use serde::{Deserialize, Serialize};

use super::report::{SyncCycleResult, SyncState};
use crate::base::BaseSnapshots;
use crate::conflict::{ConflictRecord, ConflictState, ConflictStore};
use crate::dispatch::DispatchShim;
use crate::session::SessionOutcome;
use crate::settings::SyncSettings;
use crate::triple::FileTriple;
use crate::{Error, Result};

/// Which side an operator keeps when resolving a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Local,
    Remote,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
        })
    }
}

/// Tracks the cycle's state for logging and the final report
struct Machine {
    state: SyncState,
}

impl Machine {
    fn new() -> Self {
        Self {
            state: SyncState::Idle,
        }
    }

    fn advance(&mut self, next: SyncState) {
        tracing::debug!(from = %self.state, to = %next, "Sync state");
        self.state = next;
    }
}

/// Runs sync cycles for one project
pub struct SyncCoordinator {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn RemoteSource>,
    publisher: RemotePublisher,
    settings: SyncSettings,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn RemoteSource>,
        publisher: RemotePublisher,
    ) -> Self {
        Self {
            store,
            source,
            publisher,
            settings: SyncSettings::default(),
        }
    }

    /// A coordinator pulling and pushing over the provider REST APIs.
    pub fn over_http(
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn Transport>,
        settings: SyncSettings,
    ) -> Self {
        let source = HttpRemote::new(Arc::clone(&transport)).with_budget(settings.retry);
        let publisher = RemotePublisher::new(transport);
        Self::new(store, Arc::new(source), publisher).with_settings(settings)
    }

    pub fn with_settings(mut self, settings: SyncSettings) -> Self {
        self.publisher = self.publisher.with_budget(settings.retry);
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// The configuration stored with the project, if any.
    pub fn stored_config(&self) -> Result<Option<RepoConfig>> {
        match self.store.get_adapter()? {
            Some(meta) => Ok(Some(RepoConfig::from_adapter(&meta)?)),
            None => Ok(None),
        }
    }

    pub fn conflict_state(&self) -> Result<ConflictState> {
        ConflictStore::new(self.store.as_ref()).load()
    }

    /// Run one cycle: ensure the adapter, pull, merge, persist conflicts,
    /// apply merged content locally, and push when no conflicts remain.
    ///
    /// `config` overrides the stored configuration and is stored when the
    /// project has none. With no configuration at all the cycle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only when the project itself cannot be read or
    /// written. Remote failures are reported in the result.
    pub async fn sync_project(&self, config: Option<&RepoConfig>) -> Result<SyncCycleResult> {
        let mut machine = Machine::new();
        let conflicts = ConflictStore::new(self.store.as_ref());
        let mut state = conflicts.load()?;

        machine.advance(SyncState::EnsuringAdapter);
        let config = match self.ensure_adapter(config) {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::info!("No remote configured, nothing to sync");
                return Ok(SyncCycleResult::no_op());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not establish remote adapter");
                return Ok(SyncCycleResult::aborted(machine.state, e.to_string(), state.keys()));
            }
        };

        machine.advance(SyncState::Pulling);
        let (listing, remote_files) = match self.pull(&config).await {
            Ok(pulled) => pulled,
            Err(e) => {
                tracing::warn!(error = %e, "Pull failed, aborting cycle");
                return Ok(SyncCycleResult::aborted(machine.state, e.to_string(), state.keys()));
            }
        };
        let needs_init = listing.needs_init();

        machine.advance(SyncState::BuildingTriples);
        let triples = self.build_triples(&remote_files)?;

        machine.advance(SyncState::Merging);
        let dispatched = DispatchShim::new(self.settings.dispatch_timeout)
            .run(triples.clone())
            .await;
        tracing::debug!(path = ?dispatched.path, "Merge session dispatched");
        let outcome = dispatched.value;

        self.update_conflicts(&mut state, &outcome);
        conflicts.save(&state)?;
        machine.advance(if outcome.is_clean() {
            SyncState::Clean
        } else {
            SyncState::HasConflicts
        });

        let triples: BTreeMap<&str, &FileTriple> =
            triples.iter().map(|t| (t.path.as_str(), t)).collect();
        let (applied, to_push) = self.apply(&outcome, &triples)?;

        let push_results = if !outcome.is_clean() {
            if !to_push.is_empty() {
                tracing::info!(
                    pending = to_push.len(),
                    conflicts = outcome.conflicts.len(),
                    "Conflicts present, holding back push"
                );
            }
            None
        } else if to_push.is_empty() {
            None
        } else {
            machine.advance(SyncState::Pushing);
            Some(self.push_files(&config, to_push).await?)
        };

        machine.advance(SyncState::Done);
        let result = SyncCycleResult {
            resolved: outcome.resolved,
            conflicts: outcome.conflicts.keys().cloned().collect(),
            needs_init,
            push_results,
            aborted: None,
            state: machine.state,
            head_sha: listing.head_sha,
            applied,
        };
        tracing::info!(
            resolved = result.resolved.len(),
            conflicts = result.conflicts.len(),
            pushed = result.pushed().len(),
            needs_init,
            "Sync cycle finished"
        );
        Ok(result)
    }

    /// Publish `files`, recording each successfully pushed content as the
    /// new base.
    pub async fn push_files(
        &self,
        config: &RepoConfig,
        files: Vec<PushFile>,
    ) -> Result<Vec<PushResult>> {
        let results = self.publisher.push(config, &files).await;
        let bases = BaseSnapshots::new(self.store.as_ref());
        for (file, result) in files.iter().zip(&results) {
            if result.ok {
                bases.set(&file.path, Some(&file.content))?;
            }
        }
        Ok(results)
    }

    /// Publish the current local content of `paths`.
    ///
    /// Paths with no local file are skipped, so results cover only the
    /// paths that were sent.
    pub async fn push_paths(&self, config: &RepoConfig, paths: &[String]) -> Result<Vec<PushResult>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match self.store.read_file(path)? {
                Some(content) => files.push(PushFile::new(path.clone(), content)),
                None => tracing::warn!(path = %path, "No local file to push, skipping"),
            }
        }
        self.push_files(config, files).await
    }

    /// Settle a conflict by keeping one side.
    ///
    /// The chosen content becomes the local file and the remote side becomes
    /// the base, so the next cycle publishes a local choice and leaves a
    /// remote choice alone.
    pub fn resolve_conflict(&self, key: &str, resolution: Resolution) -> Result<ConflictRecord> {
        let conflicts = ConflictStore::new(self.store.as_ref());
        let mut state = conflicts.load()?;
        let record = state
            .lookup(key)
            .cloned()
            .ok_or_else(|| Error::ConflictNotFound {
                key: key.to_string(),
            })?;

        let chosen = match resolution {
            Resolution::Local => record.local.as_deref(),
            Resolution::Remote => record.remote.as_deref(),
        };
        match chosen {
            Some(content) => self.store.write_file(&record.path, content)?,
            None => self.store.unlink(&record.path)?,
        }
        BaseSnapshots::new(self.store.as_ref()).set(&record.path, record.remote.as_deref())?;

        state.resolve(key);
        conflicts.save(&state)?;
        tracing::info!(key = %key, path = %record.path, side = %resolution, "Conflict resolved");
        Ok(record)
    }

    fn ensure_adapter(&self, config: Option<&RepoConfig>) -> Result<Option<RepoConfig>> {
        let stored = self.store.get_adapter()?;
        match (config, stored) {
            (Some(config), None) => {
                self.store.set_adapter(&config.to_adapter())?;
                Ok(Some(config.clone()))
            }
            (Some(config), Some(_)) => Ok(Some(config.clone())),
            (None, Some(meta)) => Ok(Some(RepoConfig::from_adapter(&meta)?)),
            (None, None) => Ok(None),
        }
    }

    async fn pull(
        &self,
        config: &RepoConfig,
    ) -> Result<(RemoteFileListing, BTreeMap<String, String>)> {
        let listing = self.source.fetch_tree(config).await?;
        let mut files = BTreeMap::new();
        for file in &listing.files {
            if is_reserved(&file.path) {
                continue;
            }
            let path = match validate_record_path(&file.path) {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(path = %file.path, error = %e, "Skipping remote file with unusable path");
                    continue;
                }
            };
            if let Some(content) = self.source.fetch_file(config, &file.path).await? {
                files.insert(path, content);
            }
        }
        tracing::debug!(files = files.len(), head = ?listing.head_sha, "Pulled remote");
        Ok((listing, files))
    }

    fn build_triples(&self, remote: &BTreeMap<String, String>) -> Result<Vec<FileTriple>> {
        let bases = BaseSnapshots::new(self.store.as_ref());
        let mut paths: BTreeSet<String> = self.store.list_records()?.into_iter().collect();
        paths.extend(remote.keys().cloned());
        paths.extend(bases.paths()?);

        let mut triples = Vec::with_capacity(paths.len());
        for path in paths {
            triples.push(FileTriple {
                base: bases.get(&path)?,
                local: self.store.read_file(&path)?,
                remote: remote.get(&path).cloned(),
                path,
            });
        }
        Ok(triples)
    }

    /// Drop records for paths that resolved, then fold in this cycle's
    /// conflicts, replacing records a path held under a different key.
    fn update_conflicts(&self, state: &mut ConflictState, outcome: &SessionOutcome) {
        for path in &outcome.resolved {
            if state.remove_path(path) > 0 {
                tracing::info!(path = %path, "Conflict no longer present");
            }
        }
        for (key, record) in &outcome.conflicts {
            state
                .conflicts
                .retain(|existing, r| existing == key || r.path != record.path);
        }
        state.reconcile(&outcome.conflicts);
    }

    /// Write merged content locally and collect what must be published.
    fn apply(
        &self,
        outcome: &SessionOutcome,
        triples: &BTreeMap<&str, &FileTriple>,
    ) -> Result<(Vec<String>, Vec<PushFile>)> {
        let bases = BaseSnapshots::new(self.store.as_ref());
        let mut applied = Vec::new();
        let mut to_push = Vec::new();

        for path in &outcome.resolved {
            let Some(triple) = triples.get(path.as_str()) else {
                continue;
            };
            let merged = outcome.merged.get(path).cloned().flatten();

            if merged != triple.local {
                match &merged {
                    Some(content) => self.store.write_file(path, content)?,
                    None => self.store.unlink(path)?,
                }
                tracing::info!(path = %path, deleted = merged.is_none(), "Applied merged content");
                applied.push(path.clone());
            }

            if merged == triple.remote {
                if merged != triple.base {
                    bases.set(path, merged.as_deref())?;
                }
            } else if let Some(content) = merged {
                to_push.push(PushFile::new(path.clone(), content));
            }
        }

        Ok((applied, to_push))
    }
}
