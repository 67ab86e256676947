//! [`ScriptedTransport`]: an in-memory [`Transport`] with canned responses.
//!
//! Rules match on method and a URL substring, first registered rule wins.
//! Each rule holds a queue of outcomes; the last one repeats once the queue
//! is drained. Unmatched requests get a 404.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use recsync_remote::{
    Error, HttpRequest, HttpResponse, Method, RepoConfig, Result, Transport, api,
};
use serde_json::json;

#[derive(Debug, Clone)]
enum Outcome {
    Respond(HttpResponse),
    Fail(String),
}

struct Rule {
    method: Method,
    url_contains: String,
    outcomes: VecDeque<Outcome>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests matching `method` and `url_contains`.
    pub fn on(&self, method: Method, url_contains: &str, status: u16, body: &str) -> &Self {
        self.push(method, url_contains, Outcome::Respond(HttpResponse::new(status, body)))
    }

    /// Queue a network failure for matching requests.
    pub fn fail(&self, method: Method, url_contains: &str, message: &str) -> &Self {
        self.push(method, url_contains, Outcome::Fail(message.to_string()))
    }

    fn push(&self, method: Method, url_contains: &str, outcome: Outcome) -> &Self {
        let mut rules = self.rules.lock().unwrap();
        match rules
            .iter_mut()
            .find(|r| r.method == method && r.url_contains == url_contains)
        {
            Some(rule) => rule.outcomes.push_back(outcome),
            None => rules.push(Rule {
                method,
                url_contains: url_contains.to_string(),
                outcomes: VecDeque::from([outcome]),
            }),
        }
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Number of requests sent matching `method` and `url_contains`.
    pub fn count(&self, method: Method, url_contains: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.contains(url_contains))
            .count()
    }

    /// Script a GitHub branch holding `files`: branch, tree, and contents
    /// reads all answer as the real API would.
    pub fn github_branch(&self, config: &RepoConfig, files: &[(&str, &str)]) -> &Self {
        let branch = json!({
            "name": config.branch,
            "commit": {"sha": "head1", "commit": {"tree": {"sha": "tree1"}}}
        });
        self.on(Method::Get, &api::branch_url(config), 200, &branch.to_string());

        let tree: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(i, (path, _))| json!({"path": path, "type": "blob", "sha": format!("blob{i}")}))
            .collect();
        self.on(
            Method::Get,
            &api::tree_url(config, "tree1", 1),
            200,
            &json!({"sha": "tree1", "tree": tree, "truncated": false}).to_string(),
        );

        for (i, (path, content)) in files.iter().enumerate() {
            let body = json!({
                "path": path,
                "sha": format!("blob{i}"),
                "encoding": "base64",
                "content": STANDARD.encode(content),
            });
            self.on(
                Method::Get,
                &api::file_read_url(config, path),
                200,
                &body.to_string(),
            );
        }
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.log.lock().unwrap().push(request.clone());

        let outcome = {
            let mut rules = self.rules.lock().unwrap();
            rules
                .iter_mut()
                .find(|r| r.method == request.method && request.url.contains(&r.url_contains))
                .map(|rule| {
                    if rule.outcomes.len() > 1 {
                        rule.outcomes.pop_front().unwrap()
                    } else {
                        rule.outcomes[0].clone()
                    }
                })
        };

        match outcome {
            Some(Outcome::Respond(response)) => Ok(response),
            Some(Outcome::Fail(message)) => Err(Error::network(&request.url, message)),
            None => Ok(HttpResponse::new(404, "{\"message\":\"Not Found\"}")),
        }
    }
}
