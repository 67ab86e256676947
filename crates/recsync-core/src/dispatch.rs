//! DispatchShim: run a merge session off the async executor
//!
//! The session runs on the blocking pool, raced against a timeout. If the
//! worker does not finish in time, or fails, the same function runs inline
//! and the worker's eventual result is discarded. Both paths produce
//! identical results because they call the same function.

use std::sync::Arc;
use std::time::Duration;

use crate::session::{SessionOutcome, run_threeway};
use crate::triple::FileTriple;

/// Which path produced a dispatched result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPath {
    /// The background worker finished within the timeout
    Worker,
    /// No async runtime was available; ran inline directly
    Inline,
    /// The worker timed out or failed; ran inline afterwards
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched<T> {
    pub value: T,
    pub path: DispatchPath,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchShim {
    timeout: Duration,
}

impl DispatchShim {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a three-way session over `triples`.
    pub async fn run(&self, triples: Vec<FileTriple>) -> Dispatched<SessionOutcome> {
        self.race(move || run_threeway(&triples)).await
    }

    /// Run `job` on a worker, falling back to running it inline.
    pub async fn race<F, T>(&self, job: F) -> Dispatched<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            return Dispatched {
                value: job(),
                path: DispatchPath::Inline,
            };
        }

        let job = Arc::new(job);
        let worker_job = Arc::clone(&job);
        let worker = tokio::task::spawn_blocking(move || worker_job());

        match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(value)) => Dispatched {
                value,
                path: DispatchPath::Worker,
            },
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "Merge worker failed, running inline");
                Dispatched {
                    value: job(),
                    path: DispatchPath::Fallback,
                }
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Merge worker timed out, running inline"
                );
                Dispatched {
                    value: job(),
                    path: DispatchPath::Fallback,
                }
            }
        }
    }
}

impl Default for DispatchShim {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
