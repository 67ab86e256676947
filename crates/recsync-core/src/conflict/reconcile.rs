//! Last-writer-wins reconciliation of conflict maps

use super::{ConflictMap, ConflictRecord};

/// Pick between two records for the same key.
///
/// The later timestamp wins and ties go to `incoming`. If either timestamp
/// does not parse, `incoming` wins.
pub fn newer<'a>(existing: &'a ConflictRecord, incoming: &'a ConflictRecord) -> &'a ConflictRecord {
    match (existing.parsed_timestamp(), incoming.parsed_timestamp()) {
        (Some(old), Some(new)) => {
            if old > new {
                existing
            } else {
                incoming
            }
        }
        _ => {
            tracing::warn!(
                key = %incoming.key(),
                existing = %existing.timestamp,
                incoming = %incoming.timestamp,
                "Unparsable conflict timestamp, keeping incoming record"
            );
            incoming
        }
    }
}

/// Merge `incoming` into `existing`: new keys are inserted, shared keys keep
/// the [`newer`] record, and keys only in `existing` are kept.
pub fn reconcile(existing: &ConflictMap, incoming: &ConflictMap) -> ConflictMap {
    let mut merged = existing.clone();
    for (key, record) in incoming {
        let winner = match existing.get(key) {
            Some(current) => newer(current, record),
            None => record,
        };
        merged.insert(key.clone(), winner.clone());
    }
    merged
}
