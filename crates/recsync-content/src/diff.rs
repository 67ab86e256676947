//! Semantic diff types and computation

use serde_json::Value;
use similar::TextDiff;

use crate::value::{canonical, identity_index};

/// Maximum recursion depth for diff operations
const MAX_DIFF_DEPTH: usize = 128;

/// Result of comparing two values semantically
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticDiff {
    /// Are the values canonically equal?
    pub is_equivalent: bool,
    /// Field-level changes, in traversal order
    pub changes: Vec<FieldChange>,
}

impl SemanticDiff {
    pub fn equivalent() -> Self {
        Self {
            is_equivalent: true,
            changes: Vec::new(),
        }
    }

    /// Compute a semantic diff between two values
    ///
    /// Object keys extend the path with `.key`. Arrays whose elements all
    /// carry an identity are matched by identity (`[id]`), other arrays by
    /// position (`[index]`).
    pub fn compute(old: &Value, new: &Value) -> Self {
        let mut changes = Vec::new();
        diff_values(old, new, String::new(), &mut changes, 0);

        Self {
            is_equivalent: changes.is_empty(),
            changes,
        }
    }

    /// Paths of every change, deduplicated, in traversal order.
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::with_capacity(self.changes.len());
        for change in &self.changes {
            let path = change.path();
            if !fields.iter().any(|f| f == path) {
                fields.push(path.to_string());
            }
        }
        fields
    }
}

impl Default for SemanticDiff {
    fn default() -> Self {
        Self::equivalent()
    }
}

/// A change at one location of a value tree
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Added { path: String, value: Value },
    Removed { path: String, value: Value },
    Modified { path: String, old: Value, new: Value },
}

impl FieldChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }
}

/// Unified line diff of two texts, for display.
pub fn unified(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string()
}

fn diff_values(old: &Value, new: &Value, path: String, changes: &mut Vec<FieldChange>, depth: usize) {
    // Past the depth limit a difference is reported as one modification
    if depth > MAX_DIFF_DEPTH {
        if canonical(old) != canonical(new) {
            changes.push(FieldChange::Modified {
                path,
                old: old.clone(),
                new: new.clone(),
            });
        }
        return;
    }

    match (old, new) {
        (Value::Object(old_obj), Value::Object(new_obj)) => {
            for (key, old_value) in old_obj {
                let child_path = join(&path, key);
                match new_obj.get(key) {
                    Some(new_value) => {
                        diff_values(old_value, new_value, child_path, changes, depth + 1)
                    }
                    None => changes.push(FieldChange::Removed {
                        path: child_path,
                        value: old_value.clone(),
                    }),
                }
            }
            for (key, new_value) in new_obj {
                if !old_obj.contains_key(key) {
                    changes.push(FieldChange::Added {
                        path: join(&path, key),
                        value: new_value.clone(),
                    });
                }
            }
        }

        (Value::Array(old_arr), Value::Array(new_arr)) => {
            match (identity_index(old_arr), identity_index(new_arr)) {
                (Some(old_index), Some(new_index)) => {
                    for (id, old_val) in &old_index {
                        let child_path = format!("{path}[{id}]");
                        match new_index.iter().find(|(k, _)| k == id) {
                            Some((_, new_val)) => {
                                diff_values(old_val, new_val, child_path, changes, depth + 1)
                            }
                            None => changes.push(FieldChange::Removed {
                                path: child_path,
                                value: (*old_val).clone(),
                            }),
                        }
                    }
                    for (id, new_val) in &new_index {
                        if !old_index.iter().any(|(k, _)| k == id) {
                            changes.push(FieldChange::Added {
                                path: format!("{path}[{id}]"),
                                value: (*new_val).clone(),
                            });
                        }
                    }
                }
                _ => {
                    let max_len = old_arr.len().max(new_arr.len());
                    for i in 0..max_len {
                        let child_path = format!("{path}[{i}]");
                        match (old_arr.get(i), new_arr.get(i)) {
                            (Some(old_val), Some(new_val)) => {
                                diff_values(old_val, new_val, child_path, changes, depth + 1)
                            }
                            (Some(old_val), None) => changes.push(FieldChange::Removed {
                                path: child_path,
                                value: old_val.clone(),
                            }),
                            (None, Some(new_val)) => changes.push(FieldChange::Added {
                                path: child_path,
                                value: new_val.clone(),
                            }),
                            (None, None) => {}
                        }
                    }
                }
            }
        }

        _ => {
            if old != new {
                changes.push(FieldChange::Modified {
                    path,
                    old: old.clone(),
                    new: new.clone(),
                });
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
