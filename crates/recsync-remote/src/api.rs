//! Provider endpoint layout and authentication headers

use crate::config::{DEFAULT_GITLAB_HOST, Provider, RepoConfig};

const GITHUB_API: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const GITLAB_API_VERSION: &str = "v4";

/// Page size requested from paginated listings
pub const PAGE_SIZE: usize = 100;

fn url_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Encode each path segment, keeping the separators.
fn encode_segments(path: &str) -> String {
    path.split('/').map(url_encode).collect::<Vec<_>>().join("/")
}

/// API root for the configured provider.
///
/// A host given with a scheme is used verbatim as the API root.
pub fn api_base(config: &RepoConfig) -> String {
    if let Some(host) = config.host.as_deref().filter(|h| h.starts_with("http")) {
        return host.trim_end_matches('/').to_string();
    }
    match config.provider {
        Provider::Github => match config.host.as_deref() {
            None | Some("github.com") | Some("api.github.com") => GITHUB_API.to_string(),
            Some(host) => format!("https://{}/api/v3", host.trim_end_matches('/')),
        },
        Provider::Gitlab => {
            let host = config.host.as_deref().unwrap_or(DEFAULT_GITLAB_HOST);
            format!(
                "https://{}/api/{}",
                host.trim_end_matches('/'),
                GITLAB_API_VERSION
            )
        }
    }
}

fn repo_root(config: &RepoConfig) -> String {
    match config.provider {
        Provider::Github => format!(
            "{}/repos/{}/{}",
            api_base(config),
            url_encode(&config.owner),
            url_encode(&config.repository)
        ),
        Provider::Gitlab => format!(
            "{}/projects/{}/repository",
            api_base(config),
            url_encode(&config.project_path())
        ),
    }
}

pub fn branch_url(config: &RepoConfig) -> String {
    format!("{}/branches/{}", repo_root(config), url_encode(&config.branch))
}

/// Write endpoint for one file.
pub fn file_url(config: &RepoConfig, path: &str) -> String {
    match config.provider {
        Provider::Github => format!("{}/contents/{}", repo_root(config), encode_segments(path)),
        Provider::Gitlab => format!("{}/files/{}", repo_root(config), url_encode(path)),
    }
}

/// Read endpoint for one file on the configured branch.
pub fn file_read_url(config: &RepoConfig, path: &str) -> String {
    format!("{}?ref={}", file_url(config, path), url_encode(&config.branch))
}

/// Recursive tree listing. GitHub lists by tree sha, GitLab by branch and page.
pub fn tree_url(config: &RepoConfig, tree_sha: &str, page: usize) -> String {
    match config.provider {
        Provider::Github => format!("{}/git/trees/{}?recursive=1", repo_root(config), url_encode(tree_sha)),
        Provider::Gitlab => format!(
            "{}/tree?recursive=true&ref={}&per_page={}&page={}",
            repo_root(config),
            url_encode(&config.branch),
            PAGE_SIZE,
            page
        ),
    }
}

/// Request headers for the provider, including authorization when a token
/// is configured.
pub fn headers(config: &RepoConfig) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    match config.provider {
        Provider::Github => {
            headers.push(("User-Agent".to_string(), "recsync".to_string()));
            headers.push((
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ));
            headers.push((
                "X-GitHub-Api-Version".to_string(),
                GITHUB_API_VERSION.to_string(),
            ));
            if let Some(token) = config.token() {
                headers.push(("Authorization".to_string(), github_authorization(token)));
            }
        }
        Provider::Gitlab => {
            if let Some(token) = config.token() {
                headers.push(("PRIVATE-TOKEN".to_string(), token.to_string()));
            }
        }
    }
    headers
}

/// Classic `ghp` tokens and tokens already written as `token <t>` use the
/// `token` scheme; everything else is sent as a bearer token.
pub fn github_authorization(token: &str) -> String {
    if let Some(rest) = token.strip_prefix("token ") {
        format!("token {}", rest.trim_start())
    } else if token.starts_with("ghp") {
        format!("token {token}")
    } else {
        format!("Bearer {token}")
    }
}
