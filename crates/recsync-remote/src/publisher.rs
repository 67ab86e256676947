//! Publishing local content to the remote branch
//!
//! Each path is pushed independently: branch pre-flight, revision read,
//! conditional write. A write rejected with 409/422 gets one refreshed
//! revision and one more write before it is reported as a conflict.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use recsync_fs::is_reserved;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api;
use crate::config::{Provider, RepoConfig};
use crate::retry::{RetryBudget, send_with_retry};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::Error;

/// One file to publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFile {
    pub path: String,
    pub content: String,
}

impl PushFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Why a path was not published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PushFailure {
    /// Reserved metadata path, never published
    Excluded,
    /// The branch does not exist; the remote needs initialization
    NeedsInit,
    BranchCheck,
    /// The write precondition failed even after a refresh
    Conflict,
    /// Any other non-success status
    Provider,
    /// The request never got a response
    Transport,
    Config,
}

impl fmt::Display for PushFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Excluded => "excluded",
            Self::NeedsInit => "needs initialization",
            Self::BranchCheck => "branch check failed",
            Self::Conflict => "conflict",
            Self::Provider => "provider error",
            Self::Transport => "transport error",
            Self::Config => "configuration error",
        };
        f.write_str(name)
    }
}

/// Outcome of publishing one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResult {
    pub path: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<PushFailure>,
}

impl PushResult {
    pub fn success(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ok: true,
            message: None,
            failure: None,
        }
    }

    pub fn failed(path: impl Into<String>, failure: PushFailure, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ok: false,
            message: Some(message.into()),
            failure: Some(failure),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.failure == Some(PushFailure::Conflict)
    }
}

struct Rejected {
    failure: PushFailure,
    message: String,
}

impl Rejected {
    fn new(failure: PushFailure, message: impl Into<String>) -> Self {
        Self {
            failure,
            message: message.into(),
        }
    }
}

impl From<Error> for Rejected {
    fn from(error: Error) -> Self {
        Self::new(PushFailure::Transport, error.to_string())
    }
}

/// A file as the remote currently knows it
struct RemoteRevision {
    /// GitHub blob sha or GitLab last commit id
    id: Option<String>,
}

/// Pushes files to the configured branch
#[derive(Clone)]
pub struct RemotePublisher {
    transport: Arc<dyn Transport>,
    budget: RetryBudget,
}

impl RemotePublisher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            budget: RetryBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: RetryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Push every file, returning one result per input path in input order.
    pub async fn push(&self, config: &RepoConfig, files: &[PushFile]) -> Vec<PushResult> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = if is_reserved(&file.path) {
                PushResult::failed(&file.path, PushFailure::Excluded, "excluded from push")
            } else {
                match self.push_one(config, file).await {
                    Ok(()) => {
                        tracing::info!(path = %file.path, provider = %config.provider, "Pushed file");
                        PushResult::success(&file.path)
                    }
                    Err(rejected) => {
                        tracing::warn!(
                            path = %file.path,
                            failure = %rejected.failure,
                            message = %rejected.message,
                            "Push failed"
                        );
                        PushResult::failed(&file.path, rejected.failure, rejected.message)
                    }
                }
            };
            results.push(result);
        }
        results
    }

    async fn push_one(&self, config: &RepoConfig, file: &PushFile) -> Result<(), Rejected> {
        if config.token().is_none() {
            return Err(Rejected::new(
                PushFailure::Config,
                format!("token required for {}", config.provider),
            ));
        }
        let headers = api::headers(config);

        let branch = self
            .send(
                HttpRequest::get(api::branch_url(config)).with_headers(&headers),
                self.budget.branch_attempts,
            )
            .await?;
        if !branch.is_success() {
            return Err(if branch.status == 404 {
                Rejected::new(
                    PushFailure::NeedsInit,
                    format!(
                        "{} branch missing (needs initialization): {} {}",
                        config.provider, branch.status, branch.body
                    ),
                )
            } else {
                Rejected::new(
                    PushFailure::BranchCheck,
                    format!(
                        "{} branch check failed: {} {}",
                        config.provider, branch.status, branch.body
                    ),
                )
            });
        }

        let revision = self.read_revision(config, &headers, &file.path).await?;
        let response = self
            .write(config, &headers, file, revision.as_ref(), self.budget.write_attempts)
            .await?;
        if response.is_success() {
            return Ok(());
        }

        if matches!(response.status, 409 | 422) {
            tracing::debug!(path = %file.path, status = response.status, "Write precondition failed, refreshing revision");
            if let Some(fresh) = self.read_revision(config, &headers, &file.path).await? {
                let retry = self
                    .write(config, &headers, file, Some(&fresh), self.budget.precondition_attempts)
                    .await?;
                if retry.is_success() {
                    return Ok(());
                }
            }
            return Err(Rejected::new(
                PushFailure::Conflict,
                format!(
                    "{} conflict or precondition failed: {} {}",
                    config.provider, response.status, response.body
                ),
            ));
        }

        Err(Rejected::new(
            PushFailure::Provider,
            format!("{} error: {} {}", config.provider, response.status, response.body),
        ))
    }

    /// Current revision of `path`, or `None` when the file does not exist.
    async fn read_revision(
        &self,
        config: &RepoConfig,
        headers: &[(String, String)],
        path: &str,
    ) -> Result<Option<RemoteRevision>, Rejected> {
        let response = self
            .send(
                HttpRequest::get(api::file_read_url(config, path)).with_headers(headers),
                self.budget.read_attempts,
            )
            .await?;
        if !response.is_success() {
            return Ok(None);
        }
        let field = match config.provider {
            Provider::Github => "sha",
            Provider::Gitlab => "last_commit_id",
        };
        let id = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| body.get(field).and_then(Value::as_str).map(str::to_string));
        Ok(Some(RemoteRevision { id }))
    }

    async fn write(
        &self,
        config: &RepoConfig,
        headers: &[(String, String)],
        file: &PushFile,
        revision: Option<&RemoteRevision>,
        attempts: u32,
    ) -> Result<HttpResponse, Rejected> {
        let revision_id = revision.and_then(|r| r.id.clone());
        let (method, body) = match config.provider {
            Provider::Github => {
                let mut body = json!({
                    "message": format!("update {}", file.path),
                    "content": STANDARD.encode(file.content.as_bytes()),
                    "branch": config.branch,
                });
                if let Some(sha) = revision_id {
                    body["sha"] = Value::String(sha);
                }
                (Method::Put, body)
            }
            Provider::Gitlab => {
                let mut body = json!({
                    "branch": config.branch,
                    "content": file.content,
                    "commit_message": format!("update {}", file.path),
                });
                if let Some(id) = revision_id {
                    body["last_commit_id"] = Value::String(id);
                }
                let method = if revision.is_some() {
                    Method::Put
                } else {
                    Method::Post
                };
                (method, body)
            }
        };

        let request = HttpRequest::new(method, api::file_url(config, &file.path))
            .with_headers(headers)
            .with_body(body);
        self.send(request, attempts).await
    }

    async fn send(&self, request: HttpRequest, attempts: u32) -> Result<HttpResponse, Rejected> {
        Ok(send_with_retry(
            self.transport.as_ref(),
            &request,
            attempts,
            self.budget.initial_delay,
        )
        .await?)
    }
}
