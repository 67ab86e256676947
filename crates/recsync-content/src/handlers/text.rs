//! Plain text handler: the whole file is one opaque scalar

use serde_json::Value;

use crate::error::{Error, Result, Unparsable};
use crate::format::{Format, FormatHandler};

#[derive(Debug, Default)]
pub struct TextHandler;

impl TextHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for TextHandler {
    fn format(&self) -> Format {
        Format::Text
    }

    fn parse(&self, source: &str) -> std::result::Result<Value, Unparsable> {
        Ok(Value::String(source.to_string()))
    }

    fn render(&self, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::render(Format::Text, "text content must be a string"))
    }
}
