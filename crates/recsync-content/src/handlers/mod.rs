//! Format handlers

mod json;
mod text;
mod yaml;

pub use self::json::JsonHandler;
pub use self::text::TextHandler;
pub use self::yaml::YamlHandler;
