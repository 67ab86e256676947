//! Remote provider access for recsync
//!
//! Everything that talks to a hosting provider lives here: the
//! [`RepoConfig`] describing the remote, the [`Transport`] seam over HTTP,
//! the [`RemoteSource`] used to pull a branch, and the [`RemotePublisher`]
//! that writes files back with precondition handling and bounded retries.

pub mod api;
pub mod config;
pub mod error;
pub mod publisher;
pub mod retry;
pub mod source;
pub mod transport;

pub use config::{Provider, RepoConfig};
pub use error::{Error, Result};
pub use publisher::{PushFailure, PushFile, PushResult, RemotePublisher};
pub use retry::{RetryBudget, send_with_retry};
pub use source::{HttpRemote, RemoteFile, RemoteFileListing, RemoteSource};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
