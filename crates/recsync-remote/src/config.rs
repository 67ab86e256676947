//! Remote repository configuration
//!
//! A [`RepoConfig`] is the engine's read-only view of where a project syncs
//! to. It is persisted as the provider adapter descriptor ([`AdapterMeta`])
//! and converts to and from it without loss.

use std::fmt;
use std::str::FromStr;

use recsync_fs::AdapterMeta;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Branch used when none is configured
pub const DEFAULT_BRANCH: &str = "main";

/// Host used for GitLab when none is configured
pub const DEFAULT_GITLAB_HOST: &str = "gitlab.com";

/// Supported hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Gitlab,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            other => Err(Error::Config(format!("unknown provider '{other}'"))),
        }
    }
}

/// Where and how a project syncs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConfig {
    pub provider: Provider,
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_commit_sha: Option<String>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl RepoConfig {
    pub fn new(provider: Provider, owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            provider,
            owner: owner.into(),
            repository: repository.into(),
            branch: default_branch(),
            host: None,
            token: None,
            last_synced_commit_sha: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `owner/repository`, the GitLab project id.
    pub fn project_path(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }

    /// Configured token, ignoring empty strings.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Build from a stored adapter descriptor.
    pub fn from_adapter(meta: &AdapterMeta) -> Result<Self> {
        let provider: Provider = meta.kind.parse()?;
        let (owner, repository) = match provider {
            Provider::Github => (
                required(meta, "owner")?.to_string(),
                required(meta, "repo")?.to_string(),
            ),
            Provider::Gitlab => {
                let project = required(meta, "projectId")?;
                let (owner, repository) = project.rsplit_once('/').ok_or_else(|| {
                    Error::Config(format!("projectId '{project}' is not of the form owner/repo"))
                })?;
                (owner.to_string(), repository.to_string())
            }
        };

        Ok(Self {
            provider,
            owner,
            repository,
            branch: meta.opt("branch").unwrap_or(DEFAULT_BRANCH).to_string(),
            host: meta.opt("host").map(str::to_string),
            token: meta.opt("token").map(str::to_string),
            last_synced_commit_sha: meta.opt("lastSyncedCommitSha").map(str::to_string),
        })
    }

    /// The adapter descriptor this configuration is stored as.
    pub fn to_adapter(&self) -> AdapterMeta {
        let meta = AdapterMeta::new(self.provider.as_str());
        let meta = match self.provider {
            Provider::Github => meta
                .with_opt("owner", Some(self.owner.as_str()))
                .with_opt("repo", Some(self.repository.as_str()))
                .with_opt("host", self.host.as_deref()),
            Provider::Gitlab => meta
                .with_opt("projectId", Some(self.project_path()))
                .with_opt(
                    "host",
                    Some(self.host.as_deref().unwrap_or(DEFAULT_GITLAB_HOST)),
                ),
        };
        meta.with_opt("token", self.token.as_deref())
            .with_opt("branch", Some(self.branch.as_str()))
            .with_opt("lastSyncedCommitSha", self.last_synced_commit_sha.as_deref())
    }
}

fn required<'a>(meta: &'a AdapterMeta, key: &str) -> Result<&'a str> {
    meta.opt(key)
        .ok_or_else(|| Error::Config(format!("{} adapter is missing '{key}'", meta.kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_adapter_round_trip() {
        let config = RepoConfig::new(Provider::Github, "acme", "records")
            .with_branch("dev")
            .with_token("ghp_abc");
        let meta = config.to_adapter();
        assert_eq!(meta.kind, "github");
        assert_eq!(meta.opt("repo"), Some("records"));
        assert_eq!(RepoConfig::from_adapter(&meta).unwrap(), config);
    }

    #[test]
    fn gitlab_project_id_splits_on_last_slash() {
        let meta = AdapterMeta::new("gitlab")
            .with_opt("projectId", Some("group/sub/records"))
            .with_opt("token", Some("glpat"));
        let config = RepoConfig::from_adapter(&meta).unwrap();
        assert_eq!(config.owner, "group/sub");
        assert_eq!(config.repository, "records");
        assert_eq!(config.branch, "main");
    }

    #[test]
    fn gitlab_adapter_records_default_host() {
        let meta = RepoConfig::new(Provider::Gitlab, "acme", "records").to_adapter();
        assert_eq!(meta.opt("host"), Some("gitlab.com"));
        assert_eq!(meta.opt("projectId"), Some("acme/records"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let meta = AdapterMeta::new("bitbucket");
        assert!(matches!(RepoConfig::from_adapter(&meta), Err(Error::Config(_))));
    }

    #[test]
    fn missing_owner_is_rejected() {
        let meta = AdapterMeta::new("github").with_opt("repo", Some("records"));
        assert!(RepoConfig::from_adapter(&meta).is_err());
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let config = RepoConfig::new(Provider::Github, "a", "b").with_token("");
        assert_eq!(config.token(), None);
    }
}
