//! Format detection and the handler trait

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, Unparsable};
use crate::handlers::{JsonHandler, TextHandler, YamlHandler};

/// Content formats the merge engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Text,
}

impl Format {
    /// Classify a path by its suffix. Anything not JSON or YAML is text.
    pub fn classify(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let extension = match name.rfind('.') {
            Some(idx) if idx > 0 => &name[idx + 1..],
            _ => "",
        };
        match extension.to_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Text,
        }
    }

    /// Whether values of this format are decoded into a tree before merging.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Text => "text",
        }
    }

    /// The handler implementing this format.
    pub fn handler(&self) -> &'static dyn FormatHandler {
        static JSON: JsonHandler = JsonHandler;
        static YAML: YamlHandler = YamlHandler;
        static TEXT: TextHandler = TextHandler;
        match self {
            Self::Json => &JSON,
            Self::Yaml => &YAML,
            Self::Text => &TEXT,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for format-specific handlers
pub trait FormatHandler: Send + Sync {
    /// Format identifier
    fn format(&self) -> Format;

    /// Decode source into a value tree
    fn parse(&self, source: &str) -> std::result::Result<Value, Unparsable>;

    /// Render a value tree back to text (may reformat)
    fn render(&self, value: &Value) -> Result<String>;
}

/// Decode `text` as `format`, logging and returning [`Unparsable`] on failure.
pub fn parse(format: Format, text: &str) -> std::result::Result<Value, Unparsable> {
    format.handler().parse(text).inspect_err(|e| {
        tracing::warn!(format = %format, error = %e.message, "Content is unparsable");
    })
}

/// Render `value` in `format`. Text renders a string value verbatim.
pub fn serialize(format: Format, value: &Value) -> Result<String> {
    format.handler().render(value)
}
