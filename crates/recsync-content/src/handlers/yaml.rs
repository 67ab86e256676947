//! YAML format handler using serde_yaml
//!
//! YAML is decoded into the same [`serde_json::Value`] tree as JSON so the
//! merge engine only ever sees one value model.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result, Unparsable};
use crate::format::{Format, FormatHandler};

/// Handler for YAML files using serde_yaml
#[derive(Debug, Default)]
pub struct YamlHandler;

impl YamlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for YamlHandler {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, source: &str) -> std::result::Result<Value, Unparsable> {
        let yaml: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Unparsable::new(Format::Yaml, e.to_string()))?;
        Ok(yaml_to_json(&yaml))
    }

    fn render(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| Error::render(Format::Yaml, e.to_string()))
    }
}

fn yaml_to_json(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(map) => {
            let mut object = Map::new();
            for (key, item) in map {
                object.insert(mapping_key(key), yaml_to_json(item));
            }
            Value::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

// Mapping keys become strings; non-scalar keys use their YAML spelling.
fn mapping_key(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
