//! Building conflict records from triples

use chrono::{SecondsFormat, Utc};
use recsync_content::{SemanticDiff, identity};
use serde_json::{Map, Value};

use super::{ConflictRecord, META_CONFLICT_AT, META_ERROR, META_FIELDS, META_REASON};
use crate::triple::FileTriple;

/// Why a triple could not be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictCause {
    /// A side of a structured file failed to decode
    Unparsable { message: String },
    /// Both sides changed the same location differently
    Diverged { at: String },
}

impl ConflictCause {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unparsable { .. } => "unparsable",
            Self::Diverged { .. } => "diverged",
        }
    }
}

/// The natural id of a structured triple.
///
/// Read from the first side that parses, in local, base, remote order. A
/// parsed side without an id settles the lookup to `None`.
pub fn natural_id(triple: &FileTriple) -> Option<String> {
    let format = triple.format();
    if !format.is_structured() {
        return None;
    }
    let handler = format.handler();
    let parsed = [&triple.local, &triple.base, &triple.remote]
        .into_iter()
        .flatten()
        .find_map(|text| handler.parse(text).ok())?;
    identity(&parsed)
}

/// Record `triple` as a conflict, stamped with the current time.
pub fn record(triple: &FileTriple, cause: ConflictCause) -> ConflictRecord {
    let format = triple.format();
    let mut metadata = Map::new();
    metadata.insert(META_REASON.to_string(), Value::from(cause.reason()));
    match &cause {
        ConflictCause::Unparsable { message } => {
            metadata.insert(META_ERROR.to_string(), Value::from(message.as_str()));
        }
        ConflictCause::Diverged { at } => {
            metadata.insert(META_CONFLICT_AT.to_string(), Value::from(at.as_str()));
        }
    }

    if format.is_structured()
        && let (Some(local), Some(remote)) = (&triple.local, &triple.remote)
        && let (Ok(local), Ok(remote)) = (format.handler().parse(local), format.handler().parse(remote))
    {
        let fields = SemanticDiff::compute(&local, &remote).fields();
        metadata.insert(
            META_FIELDS.to_string(),
            Value::Array(fields.into_iter().map(Value::String).collect()),
        );
    }

    let record = ConflictRecord {
        id: natural_id(triple),
        path: triple.path.clone(),
        format,
        base: triple.base.clone(),
        local: triple.local.clone(),
        remote: triple.remote.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        metadata,
    };
    tracing::info!(
        key = %record.key(),
        path = %record.path,
        reason = cause.reason(),
        "Conflict recorded"
    );
    record
}
