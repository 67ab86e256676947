//! Record store and filesystem abstraction for recsync
//!
//! Provides normalized record paths, atomic I/O, format-agnostic
//! configuration loading, and the [`RecordStore`] capability the sync
//! engine reads and writes project records through.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use config::ConfigStore;
pub use constants::{RESERVED_PREFIX, SyncPath, is_reserved};
pub use error::{Error, Result};
pub use path::{NormalizedPath, validate_record_path};
pub use store::{AdapterMeta, DirEntry, DirStore, RecordStore};
