//! Shared test utilities for the recsync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] temporary project directories
//! - [`transport`]: [`ScriptedTransport`] in-memory HTTP for provider tests
//! - [`remote`]: [`MemoryRemote`] in-memory remote branch

pub mod project;
pub mod remote;
pub mod transport;

pub use project::TestProject;
pub use remote::MemoryRemote;
pub use transport::ScriptedTransport;
