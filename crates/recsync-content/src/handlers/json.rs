//! JSON format handler

use serde_json::Value;

use crate::error::{Error, Result, Unparsable};
use crate::format::{Format, FormatHandler};

/// Handler for JSON files
#[derive(Debug, Default)]
pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for JsonHandler {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, source: &str) -> std::result::Result<Value, Unparsable> {
        serde_json::from_str(source).map_err(|e| Unparsable::new(Format::Json, e.to_string()))
    }

    fn render(&self, value: &Value) -> Result<String> {
        let mut rendered =
            serde_json::to_string_pretty(value).map_err(|e| Error::render(Format::Json, e.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_document() {
        let value = JsonHandler.parse(r#"{"id": "1", "tags": ["a"]}"#).unwrap();
        assert_eq!(value, json!({"id": "1", "tags": ["a"]}));
    }

    #[test]
    fn parse_error_is_unparsable() {
        let err = JsonHandler.parse("{\"id\": ").unwrap_err();
        assert_eq!(err.format, Format::Json);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn empty_input_is_unparsable() {
        assert!(JsonHandler.parse("").is_err());
    }

    #[test]
    fn render_is_pretty_with_trailing_newline() {
        let rendered = JsonHandler.render(&json!({"v": 1})).unwrap();
        assert_eq!(rendered, "{\n  \"v\": 1\n}\n");
    }
}
