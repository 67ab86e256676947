//! The per-file merge input

use recsync_content::Format;

/// Base, local and remote content of one path. `None` means the file does
/// not exist on that side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileTriple {
    pub path: String,
    pub base: Option<String>,
    pub local: Option<String>,
    pub remote: Option<String>,
}

impl FileTriple {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, content: impl Into<String>) -> Self {
        self.base = Some(content.into());
        self
    }

    pub fn with_local(mut self, content: impl Into<String>) -> Self {
        self.local = Some(content.into());
        self
    }

    pub fn with_remote(mut self, content: impl Into<String>) -> Self {
        self.remote = Some(content.into());
        self
    }

    pub fn format(&self) -> Format {
        Format::classify(&self.path)
    }
}
