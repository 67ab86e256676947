//! Three-way merge of parsed values
//!
//! [`merge`] settles a `(base, local, remote)` triple either to a merged
//! value or to a conflict. Absent sides are values in their own right: a
//! deletion on one side against an untouched other side merges to `None`.
//!
//! Strategies, chosen on the shape of all three sides:
//!
//! * arrays whose elements are all identified mappings merge per identity
//! * objects merge per key, each key compared as a whole value
//! * anything else is compared as a whole value

use std::fmt;

use serde_json::{Map, Value};

use crate::value::{changed, equivalent, identity_index};

/// Result of merging one triple
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The merged value; `None` when the value ends up deleted
    Merged(Option<Value>),
    /// Both sides changed the same location differently
    Conflict(MergeConflict),
}

impl MergeOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Location of the first divergence found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    /// Dotted path to the diverging field; empty for the whole value.
    /// Identity array elements appear as `[id]`.
    pub at: String,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.at.is_empty() {
            f.write_str("conflict at <root>")
        } else {
            write!(f, "conflict at {}", self.at)
        }
    }
}

/// The side a whole-value comparison settles on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Local,
    Remote,
}

/// Whole-value decision table.
///
/// Returns `None` when both sides changed and did not converge.
pub fn choose(local_changed: bool, remote_changed: bool, convergent: bool) -> Option<Side> {
    match (local_changed, remote_changed) {
        (false, false) => Some(Side::Base),
        (true, false) => Some(Side::Local),
        (false, true) => Some(Side::Remote),
        (true, true) if convergent => Some(Side::Local),
        (true, true) => None,
    }
}

/// Merge a triple of parsed values.
pub fn merge(base: Option<&Value>, local: Option<&Value>, remote: Option<&Value>) -> MergeOutcome {
    merge_at(base, local, remote, "")
}

fn merge_at(
    base: Option<&Value>,
    local: Option<&Value>,
    remote: Option<&Value>,
    at: &str,
) -> MergeOutcome {
    match (base, local, remote) {
        (Some(Value::Array(b)), Some(Value::Array(l)), Some(Value::Array(r))) => {
            match (identity_index(b), identity_index(l), identity_index(r)) {
                (Some(b), Some(l), Some(r)) => merge_identity_array(&b, &l, &r, at),
                _ => whole(base, local, remote, at),
            }
        }
        (Some(Value::Object(b)), Some(Value::Object(l)), Some(Value::Object(r))) => {
            merge_object(b, l, r, at)
        }
        _ => whole(base, local, remote, at),
    }
}

fn whole(
    base: Option<&Value>,
    local: Option<&Value>,
    remote: Option<&Value>,
    at: &str,
) -> MergeOutcome {
    let side = choose(
        changed(base, local),
        changed(base, remote),
        equivalent(local, remote),
    );
    match side {
        Some(Side::Base) => MergeOutcome::Merged(base.cloned()),
        Some(Side::Local) => MergeOutcome::Merged(local.cloned()),
        Some(Side::Remote) => MergeOutcome::Merged(remote.cloned()),
        None => MergeOutcome::Conflict(MergeConflict { at: at.to_string() }),
    }
}

fn merge_object(
    base: &Map<String, Value>,
    local: &Map<String, Value>,
    remote: &Map<String, Value>,
    at: &str,
) -> MergeOutcome {
    let mut keys: Vec<&String> = local.keys().collect();
    for key in remote.keys().chain(base.keys()) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut merged = Map::new();
    for key in keys {
        let field_at = join_field(at, key);
        match whole(base.get(key), local.get(key), remote.get(key), &field_at) {
            MergeOutcome::Merged(Some(value)) => {
                merged.insert(key.clone(), value);
            }
            MergeOutcome::Merged(None) => {}
            conflict @ MergeOutcome::Conflict(_) => return conflict,
        }
    }
    MergeOutcome::Merged(Some(Value::Object(merged)))
}

fn merge_identity_array(
    base: &[(String, &Value)],
    local: &[(String, &Value)],
    remote: &[(String, &Value)],
    at: &str,
) -> MergeOutcome {
    let mut ids: Vec<&str> = Vec::new();
    for (id, _) in local.iter().chain(remote).chain(base) {
        if !ids.contains(&id.as_str()) {
            ids.push(id.as_str());
        }
    }

    let mut merged = Vec::with_capacity(ids.len());
    for id in ids {
        let element_at = format!("{at}[{id}]");
        let (b, l, r) = (find(base, id), find(local, id), find(remote, id));
        let outcome = match (&b, &l, &r) {
            (Some(Value::Object(bo)), Some(Value::Object(lo)), Some(Value::Object(ro))) => {
                merge_object(bo, lo, ro, &element_at)
            }
            // Added on both sides: every field is new on each side.
            (None, Some(Value::Object(lo)), Some(Value::Object(ro))) => {
                merge_object(&Map::new(), lo, ro, &element_at)
            }
            _ => whole(b.as_ref(), l.as_ref(), r.as_ref(), &element_at),
        };
        match outcome {
            MergeOutcome::Merged(Some(value)) => merged.push(value),
            MergeOutcome::Merged(None) => {}
            conflict @ MergeOutcome::Conflict(_) => return conflict,
        }
    }
    MergeOutcome::Merged(Some(Value::Array(merged)))
}

fn find(index: &[(String, &Value)], id: &str) -> Option<Value> {
    index
        .iter()
        .find(|(key, _)| key == id)
        .map(|(_, value)| (*value).clone())
}

fn join_field(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_string()
    } else {
        format!("{at}.{key}")
    }
}
