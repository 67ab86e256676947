//! Bounded exponential retry for provider requests
//!
//! A request is retried when the transport fails or the provider answers
//! 5xx, until its attempt budget is spent. The final attempt's 5xx response
//! is returned as-is so callers can report it; a final transport failure is
//! returned as the error.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};

use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::{Error, Result};

/// Attempt budgets per request kind, and the first retry delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryBudget {
    /// Delay before the first retry; doubles for each further retry.
    #[serde(rename = "initial_delay_ms", with = "millis")]
    pub initial_delay: Duration,
    pub branch_attempts: u32,
    pub read_attempts: u32,
    pub write_attempts: u32,
    /// Attempts for the write that follows a refreshed precondition.
    pub precondition_attempts: u32,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            branch_attempts: 2,
            read_attempts: 2,
            write_attempts: 3,
            precondition_attempts: 2,
        }
    }
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Send `request`, retrying transient failures up to `attempts` times in total.
pub async fn send_with_retry(
    transport: &dyn Transport,
    request: &HttpRequest,
    attempts: u32,
    initial_delay: Duration,
) -> Result<HttpResponse> {
    let attempts = attempts.max(1);
    let attempt = AtomicU32::new(0);
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(initial_delay)
        .with_multiplier(2.0)
        .with_randomization_factor(0.0)
        .with_max_interval(Duration::from_secs(60))
        .with_max_elapsed_time(None)
        .build();

    let operation = || {
        let current = attempt.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            match transport.send(request).await {
                Ok(response) if response.is_server_error() && current < attempts => {
                    Err(backoff::Error::transient(Error::Status {
                        url: request.url.clone(),
                        status: response.status,
                        body: response.body,
                    }))
                }
                Ok(response) => Ok(response),
                Err(e) if e.is_transient() && current < attempts => {
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        }
    };

    let notify = |error: Error, wait: Duration| {
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            error = %error,
            wait_ms = wait.as_millis() as u64,
            "Retrying request"
        );
    };

    backoff::future::retry_notify(policy, operation, notify).await
}
