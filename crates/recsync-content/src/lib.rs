//! Format-aware parsing, diffing, and three-way merging for recsync
//!
//! Record files are classified by extension into a [`Format`], decoded into
//! a [`serde_json::Value`] tree (YAML included), and merged against their
//! base with [`merge`]. Decode failures are values, not panics: see
//! [`format::parse`].

pub mod diff;
pub mod error;
pub mod format;
pub mod handlers;
pub mod merge;
pub mod value;

pub use diff::{FieldChange, SemanticDiff, unified};
pub use error::{Error, Result, Unparsable};
pub use format::{Format, FormatHandler};
pub use merge::{MergeConflict, MergeOutcome, Side, choose, merge};
pub use value::{IDENTITY_FIELDS, canonical, changed, equivalent, identity};
