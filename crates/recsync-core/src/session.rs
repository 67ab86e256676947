//! ThreewaySession: merge a batch of triples
//!
//! Every input path ends up in exactly one of `resolved` or `conflicts`.
//! Structured files are parsed on all present sides and merged; any side
//! that fails to parse turns the file into a conflict. Text files are
//! compared as whole strings.

use std::collections::BTreeMap;

use recsync_content::format::{self, Format};
use recsync_content::{MergeOutcome, Side, canonical, choose, merge};
use serde_json::Value;

use crate::conflict::{ConflictCause, ConflictMap, ConflictRecord, record};
use crate::triple::FileTriple;

/// Partition of a session's input paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOutcome {
    /// Paths that merged cleanly, in input order
    pub resolved: Vec<String>,
    pub conflicts: ConflictMap,
    /// Merged content per resolved path; `None` means the file is deleted
    pub merged: BTreeMap<String, Option<String>>,
}

impl SessionOutcome {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

enum Settled {
    Merged(Option<String>),
    Conflict(ConflictRecord),
}

/// Run the merge over every triple.
pub fn run_threeway(triples: &[FileTriple]) -> SessionOutcome {
    let mut outcome = SessionOutcome::default();

    for triple in triples {
        match settle(triple) {
            Settled::Merged(content) => {
                outcome.resolved.push(triple.path.clone());
                outcome.merged.insert(triple.path.clone(), content);
            }
            Settled::Conflict(mut record) => {
                if let Some(other) = outcome.conflicts.get(record.key())
                    && other.path != record.path
                {
                    tracing::warn!(
                        id = %record.key(),
                        path = %record.path,
                        other = %other.path,
                        "Natural id already used by another path, keying conflict by path"
                    );
                    record.id = None;
                }
                outcome.conflicts.insert(record.key().to_string(), record);
            }
        }
    }

    tracing::debug!(
        resolved = outcome.resolved.len(),
        conflicts = outcome.conflicts.len(),
        "Three-way session finished"
    );
    outcome
}

fn settle(triple: &FileTriple) -> Settled {
    let kind = triple.format();
    if !kind.is_structured() {
        return settle_text(triple);
    }

    let parse_side = |side: &Option<String>| -> Result<Option<Value>, String> {
        side.as_deref()
            .map(|text| format::parse(kind, text))
            .transpose()
            .map_err(|e| e.to_string())
    };
    let sides = (
        parse_side(&triple.base),
        parse_side(&triple.local),
        parse_side(&triple.remote),
    );
    let (base, local, remote) = match sides {
        (Ok(base), Ok(local), Ok(remote)) => (base, local, remote),
        (base, local, remote) => {
            let message = [base.err(), local.err(), remote.err()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("; ");
            return Settled::Conflict(record(triple, ConflictCause::Unparsable { message }));
        }
    };

    match merge(base.as_ref(), local.as_ref(), remote.as_ref()) {
        MergeOutcome::Merged(None) => Settled::Merged(None),
        MergeOutcome::Merged(Some(value)) => match render(triple, kind, &value) {
            Ok(text) => Settled::Merged(Some(text)),
            Err(message) => Settled::Conflict(record(triple, ConflictCause::Unparsable { message })),
        },
        MergeOutcome::Conflict(conflict) => {
            Settled::Conflict(record(triple, ConflictCause::Diverged { at: conflict.at }))
        }
    }
}

fn settle_text(triple: &FileTriple) -> Settled {
    let (base, local, remote) = (
        triple.base.as_deref(),
        triple.local.as_deref(),
        triple.remote.as_deref(),
    );
    match choose(local != base, remote != base, local == remote) {
        Some(Side::Base) => Settled::Merged(base.map(str::to_string)),
        Some(Side::Local) => Settled::Merged(local.map(str::to_string)),
        Some(Side::Remote) => Settled::Merged(remote.map(str::to_string)),
        None => Settled::Conflict(record(
            triple,
            ConflictCause::Diverged { at: String::new() },
        )),
    }
}

/// Text for a merged value, reusing a side's exact text when it already
/// holds an equal value so untouched files keep their formatting.
fn render(triple: &FileTriple, kind: Format, value: &Value) -> Result<String, String> {
    let wanted = canonical(value);
    for text in [&triple.local, &triple.remote, &triple.base].into_iter().flatten() {
        if let Ok(parsed) = kind.handler().parse(text)
            && canonical(&parsed) == wanted
        {
            return Ok(text.clone());
        }
    }
    format::serialize(kind, value).map_err(|e| e.to_string())
}
