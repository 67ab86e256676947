//! Reading the remote branch: listing and file contents

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api;
use crate::config::{Provider, RepoConfig};
use crate::retry::{RetryBudget, send_with_retry};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::{Error, Result};

/// One file on the remote branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
}

/// Snapshot of the remote branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileListing {
    /// Head commit of the branch; `None` when the branch does not exist
    pub head_sha: Option<String>,
    pub files: Vec<RemoteFile>,
}

impl RemoteFileListing {
    /// Whether the remote has no history or no content yet.
    pub fn needs_init(&self) -> bool {
        self.head_sha.is_none() || self.files.is_empty()
    }
}

/// Read access to the remote branch
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_tree(&self, config: &RepoConfig) -> Result<RemoteFileListing>;

    /// Content of `path` on the branch, `None` when it does not exist.
    async fn fetch_file(&self, config: &RepoConfig, path: &str) -> Result<Option<String>>;
}

/// [`RemoteSource`] over the provider REST APIs
#[derive(Clone)]
pub struct HttpRemote {
    transport: Arc<dyn Transport>,
    budget: RetryBudget,
}

impl HttpRemote {
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

    async fn get(&self, config: &RepoConfig, url: String) -> Result<HttpResponse> {
        let request = HttpRequest::get(url).with_headers(&api::headers(config));
        send_with_retry(
            self.transport.as_ref(),
            &request,
            self.budget.read_attempts,
            self.budget.initial_delay,
        )
        .await
    }

    async fn fetch_github_tree(&self, config: &RepoConfig, branch: &Value) -> Result<RemoteFileListing> {
        let head = str_at(branch, &["commit", "sha"]).ok_or_else(|| Error::decode("branch", "missing commit sha"))?;
        let tree_sha = str_at(branch, &["commit", "commit", "tree", "sha"]).unwrap_or(head);

        let url = api::tree_url(config, tree_sha, 1);
        let response = self.get(config, url.clone()).await?;
        let tree: Value = expect_success(response, url)?.json("tree")?;
        if tree.get("truncated").and_then(Value::as_bool) == Some(true) {
            tracing::warn!(repository = %config.project_path(), "Remote tree listing was truncated");
        }

        let files = tree
            .get("tree")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("blob"))
                    .filter_map(|entry| remote_file(entry, "sha"))
                    .collect()
            })
            .unwrap_or_default();

        Ok(RemoteFileListing {
            head_sha: Some(head.to_string()),
            files,
        })
    }

    async fn fetch_gitlab_tree(&self, config: &RepoConfig, branch: &Value) -> Result<RemoteFileListing> {
        let head = str_at(branch, &["commit", "id"]).ok_or_else(|| Error::decode("branch", "missing commit id"))?;

        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let url = api::tree_url(config, head, page);
            let response = self.get(config, url.clone()).await?;
            let entries: Vec<Value> = expect_success(response, url)?.json("tree")?;
            let count = entries.len();
            files.extend(
                entries
                    .iter()
                    .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("blob"))
                    .filter_map(|entry| remote_file(entry, "id")),
            );
            if count < api::PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(RemoteFileListing {
            head_sha: Some(head.to_string()),
            files,
        })
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_tree(&self, config: &RepoConfig) -> Result<RemoteFileListing> {
        let url = api::branch_url(config);
        let response = self.get(config, url.clone()).await?;
        if response.status == 404 {
            tracing::info!(branch = %config.branch, "Remote branch does not exist");
            return Ok(RemoteFileListing::default());
        }
        let branch: Value = expect_success(response, url)?.json("branch")?;

        let listing = match config.provider {
            Provider::Github => self.fetch_github_tree(config, &branch).await?,
            Provider::Gitlab => self.fetch_gitlab_tree(config, &branch).await?,
        };
        tracing::debug!(
            head = ?listing.head_sha,
            files = listing.files.len(),
            "Fetched remote tree"
        );
        Ok(listing)
    }

    async fn fetch_file(&self, config: &RepoConfig, path: &str) -> Result<Option<String>> {
        let url = api::file_read_url(config, path);
        let response = self.get(config, url.clone()).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let body: Value = expect_success(response, url)?.json("file")?;
        let content = body
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::decode(path, "missing content"))?;

        match body.get("encoding").and_then(Value::as_str) {
            Some("base64") | None => decode_base64(path, content).map(Some),
            Some(_) => Ok(Some(content.to_string())),
        }
    }
}

fn expect_success(response: HttpResponse, url: String) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            url,
            status: response.status,
            body: response.body,
        })
    }
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))?
        .as_str()
}

fn remote_file(entry: &Value, sha_field: &str) -> Option<RemoteFile> {
    Some(RemoteFile {
        path: entry.get("path")?.as_str()?.to_string(),
        sha: entry.get(sha_field)?.as_str()?.to_string(),
    })
}

/// Providers wrap base64 content at 60 columns.
fn decode_base64(path: &str, content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| Error::decode(path, e))?;
    String::from_utf8(bytes).map_err(|e| Error::decode(path, e))
}
