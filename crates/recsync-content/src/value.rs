//! Canonical equality and identity over parsed value trees
//!
//! Every equality decision in the merge engine goes through [`canonical`]:
//! two values are equal when their key-sorted compact serializations are
//! byte-identical. An absent side (`None`) is never equal to a present one.

use serde_json::{Map, Value};

/// Field names that carry a record's natural identity, in lookup order.
pub const IDENTITY_FIELDS: [&str; 2] = ["id", "ID"];

/// Compact serialization with object keys sorted at every depth.
pub fn canonical(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Whether two optional values are canonically equal.
pub fn equivalent(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || canonical(a) == canonical(b),
        _ => false,
    }
}

/// Whether `candidate` differs from `base`.
pub fn changed(base: Option<&Value>, candidate: Option<&Value>) -> bool {
    !equivalent(base, candidate)
}

/// The natural identity of a mapping: its `id` (or `ID`) field when that
/// field is a string or a number.
pub fn identity(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    IDENTITY_FIELDS.iter().find_map(|field| match map.get(*field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Index the elements of an identity array by id, preserving order.
///
/// Returns `None` unless every element is a mapping with an identity and no
/// identity repeats.
pub fn identity_index(items: &[Value]) -> Option<Vec<(String, &Value)>> {
    let mut index: Vec<(String, &Value)> = Vec::with_capacity(items.len());
    for item in items {
        let id = identity(item)?;
        if index.iter().any(|(seen, _)| *seen == id) {
            return None;
        }
        index.push((id, item));
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":{"d":2,"c":3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":{"c":3,"d":2},"b":1}"#).unwrap();
        assert_eq!(canonical(&a), canonical(&b));
        assert!(equivalent(Some(&a), Some(&b)));
    }

    #[test]
    fn array_order_is_significant() {
        assert!(changed(Some(&json!([1, 2])), Some(&json!([2, 1]))));
    }

    #[test]
    fn absent_differs_from_null() {
        assert!(changed(None, Some(&Value::Null)));
        assert!(!changed(None, None));
    }

    #[test]
    fn identity_reads_id_then_upper_id() {
        assert_eq!(identity(&json!({"id": "p1"})), Some("p1".to_string()));
        assert_eq!(identity(&json!({"ID": 7})), Some("7".to_string()));
        assert_eq!(identity(&json!({"id": "a", "ID": "b"})), Some("a".to_string()));
        assert_eq!(identity(&json!({"id": null})), None);
        assert_eq!(identity(&json!({"id": ["x"]})), None);
        assert_eq!(identity(&json!("id")), None);
    }

    #[test]
    fn identity_index_rejects_duplicates_and_plain_elements() {
        let items = vec![json!({"id": "a"}), json!({"id": "b"})];
        let index = identity_index(&items).unwrap();
        assert_eq!(index[0].0, "a");
        assert_eq!(index[1].0, "b");

        assert!(identity_index(&[json!({"id": "a"}), json!({"id": "a"})]).is_none());
        assert!(identity_index(&[json!({"id": "a"}), json!(3)]).is_none());
        assert!(identity_index(&[]).is_some());
    }
}
