//! End-to-end sync cycles over the provider HTTP APIs
//!
//! Each test runs the coordinator with the real `HttpRemote` and
//! `RemotePublisher` against a scripted transport, so the full
//! pull, merge, persist, and push path is exercised without a network.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;
use recsync_core::{Resolution, SyncCoordinator, SyncSettings, SyncState};
use recsync_remote::{Method, Provider, PushFailure, RepoConfig, RetryBudget, api};
use recsync_test_utils::{ScriptedTransport, TestProject};
use serde_json::json;

fn github() -> RepoConfig {
    RepoConfig::new(Provider::Github, "acme", "records").with_token("ghp_token")
}

fn fast_settings() -> SyncSettings {
    SyncSettings {
        retry: RetryBudget {
            initial_delay: Duration::from_millis(1),
            ..RetryBudget::default()
        },
        ..SyncSettings::default()
    }
}

fn coordinator(project: &TestProject, transport: &Arc<ScriptedTransport>) -> SyncCoordinator {
    SyncCoordinator::over_http(Arc::new(project.store()), transport.clone(), fast_settings())
}

fn put_bodies(transport: &ScriptedTransport) -> Vec<serde_json::Value> {
    transport
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Put)
        .filter_map(|r| r.body)
        .collect()
}

#[tokio::test]
async fn remote_edit_is_pulled_and_nothing_is_pushed() {
    let config = github();
    let project = TestProject::new()
        .with_file("people/ada.json", "{\"id\":\"ada\",\"role\":\"analyst\"}")
        .with_base("people/ada.json", "{\"id\":\"ada\",\"role\":\"analyst\"}");
    let transport = Arc::new(ScriptedTransport::new());
    transport.github_branch(
        &config,
        &[("people/ada.json", "{\"id\":\"ada\",\"role\":\"engineer\"}")],
    );

    let result = coordinator(&project, &transport)
        .sync_project(Some(&config))
        .await
        .unwrap();

    assert_eq!(result.state, SyncState::Done);
    assert_eq!(result.head_sha.as_deref(), Some("head1"));
    assert_eq!(result.applied, vec!["people/ada.json".to_string()]);
    assert!(result.push_results.is_none());
    project.assert_file_contains("people/ada.json", "engineer");
    assert_eq!(
        project.base("people/ada.json").as_deref(),
        Some("{\"id\":\"ada\",\"role\":\"engineer\"}")
    );
    assert_eq!(transport.count(Method::Put, ""), 0);
}

#[tokio::test]
async fn disjoint_field_edits_merge_and_publish() {
    let config = github();
    let base = "{\"id\":\"ada\",\"role\":\"analyst\",\"team\":\"core\"}";
    let project = TestProject::new()
        .with_file("ada.json", "{\"id\":\"ada\",\"role\":\"lead\",\"team\":\"core\"}")
        .with_base("ada.json", base);
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .github_branch(
            &config,
            &[("ada.json", "{\"id\":\"ada\",\"role\":\"analyst\",\"team\":\"infra\"}")],
        )
        .on(Method::Put, &api::file_url(&config, "ada.json"), 200, "{}");

    let result = coordinator(&project, &transport)
        .sync_project(Some(&config))
        .await
        .unwrap();

    assert!(result.is_clean());
    assert_eq!(result.pushed(), vec!["ada.json"]);

    let merged: serde_json::Value =
        serde_json::from_str(&project.read("ada.json").unwrap()).unwrap();
    assert_eq!(merged, json!({"id": "ada", "role": "lead", "team": "infra"}));
    assert_eq!(project.base("ada.json"), project.read("ada.json"));

    let bodies = put_bodies(&transport);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["sha"], "blob0");
    let pushed = STANDARD.decode(bodies[0]["content"].as_str().unwrap()).unwrap();
    assert_eq!(String::from_utf8(pushed).unwrap(), project.read("ada.json").unwrap());
}

#[tokio::test]
async fn conflict_blocks_every_push_until_resolved() {
    let config = github();
    let project = TestProject::new()
        .with_file("list.json", "[{\"id\":\"1\",\"v\":2}]")
        .with_base("list.json", "[{\"id\":\"1\",\"v\":1}]")
        .with_file("notes.md", "local notes\n")
        .with_base("notes.md", "notes\n");
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .github_branch(
            &config,
            &[("list.json", "[{\"id\":\"1\",\"v\":3}]"), ("notes.md", "notes\n")],
        )
        .on(Method::Put, "/contents/", 200, "{}");
    let coordinator = coordinator(&project, &transport);

    let first = coordinator.sync_project(Some(&config)).await.unwrap();
    assert_eq!(first.conflicts, vec!["list.json".to_string()]);
    assert_eq!(first.resolved, vec!["notes.md".to_string()]);
    assert!(first.push_results.is_none());
    assert_eq!(transport.count(Method::Put, ""), 0);

    let record = coordinator.conflict_state().unwrap();
    let record = record.lookup("list.json").unwrap();
    assert_eq!(record.conflict_at(), Some("[1].v"));
    assert_eq!(record.fields(), vec!["[1].v".to_string()]);

    coordinator
        .resolve_conflict("list.json", Resolution::Local)
        .unwrap();
    let second = coordinator.sync_project(None).await.unwrap();

    assert!(second.is_clean());
    let mut pushed = second.pushed();
    pushed.sort();
    assert_eq!(pushed, vec!["list.json", "notes.md"]);
    assert!(coordinator.conflict_state().unwrap().is_empty());
}

#[tokio::test]
async fn stale_revision_is_refreshed_once() {
    let config = github();
    let project = TestProject::new()
        .with_file("a.txt", "new\n")
        .with_base("a.txt", "old\n");
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .github_branch(&config, &[("a.txt", "old\n")])
        .on(Method::Put, &api::file_url(&config, "a.txt"), 409, "{\"message\":\"sha mismatch\"}")
        .on(Method::Put, &api::file_url(&config, "a.txt"), 200, "{}");

    let result = coordinator(&project, &transport)
        .sync_project(Some(&config))
        .await
        .unwrap();

    assert_eq!(result.pushed(), vec!["a.txt"]);
    assert_eq!(transport.count(Method::Put, "/contents/a.txt"), 2);
    assert_eq!(project.base("a.txt").as_deref(), Some("new\n"));
}

#[tokio::test]
async fn persistent_precondition_failure_is_a_push_conflict() {
    let config = github();
    let project = TestProject::new()
        .with_file("a.txt", "new\n")
        .with_base("a.txt", "old\n")
        .with_file("b.txt", "b2\n")
        .with_base("b.txt", "b1\n");
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .github_branch(&config, &[("a.txt", "old\n"), ("b.txt", "b1\n")])
        .on(Method::Put, &api::file_url(&config, "a.txt"), 409, "{\"message\":\"sha mismatch\"}")
        .on(Method::Put, &api::file_url(&config, "b.txt"), 200, "{}");

    let result = coordinator(&project, &transport)
        .sync_project(Some(&config))
        .await
        .unwrap();

    let pushes = result.push_results.unwrap();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0].path, "a.txt");
    assert!(!pushes[0].ok);
    assert_eq!(pushes[0].failure, Some(PushFailure::Conflict));
    assert!(pushes[0].message.as_deref().unwrap().contains("conflict or precondition failed"));
    assert!(pushes[1].ok);

    assert_eq!(project.base("a.txt").as_deref(), Some("old\n"));
    assert_eq!(project.base("b.txt").as_deref(), Some("b2\n"));
}

#[tokio::test]
async fn server_errors_during_pull_abort_the_cycle() {
    let config = github();
    let project = TestProject::new().with_file("a.txt", "local\n");
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(Method::Get, &api::branch_url(&config), 502, "bad gateway");

    let result = coordinator(&project, &transport)
        .sync_project(Some(&config))
        .await
        .unwrap();

    assert_eq!(result.state, SyncState::Pulling);
    assert!(result.aborted.is_some());
    assert_eq!(transport.count(Method::Get, &api::branch_url(&config)), 2);
    assert_eq!(project.read("a.txt").as_deref(), Some("local\n"));
    project.assert_file_not_exists(".repo-sync/conflicts.json");
}

#[tokio::test]
async fn gitlab_cycle_pulls_pages_and_creates_new_files() {
    let config = RepoConfig::new(Provider::Gitlab, "acme/team", "records").with_token("glpat");
    let project = TestProject::new().with_file("local-only.yaml", "name: fresh\n");
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .on(
            Method::Get,
            &api::branch_url(&config),
            200,
            &json!({"name": "main", "commit": {"id": "c0ffee"}}).to_string(),
        )
        .on(
            Method::Get,
            &api::tree_url(&config, "c0ffee", 1),
            200,
            &json!([{"path": "remote.txt", "type": "blob", "id": "b1"}]).to_string(),
        )
        .on(
            Method::Get,
            &api::file_read_url(&config, "remote.txt"),
            200,
            &json!({
                "file_path": "remote.txt",
                "encoding": "base64",
                "content": STANDARD.encode("from gitlab\n"),
                "last_commit_id": "c0ffee"
            })
            .to_string(),
        )
        .on(Method::Post, &api::file_url(&config, "local-only.yaml"), 201, "{}");

    let result = coordinator(&project, &transport)
        .sync_project(Some(&config))
        .await
        .unwrap();

    assert_eq!(result.head_sha.as_deref(), Some("c0ffee"));
    assert_eq!(project.read("remote.txt").as_deref(), Some("from gitlab\n"));
    assert_eq!(result.pushed(), vec!["local-only.yaml"]);

    let post = transport
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post)
        .unwrap();
    assert_eq!(post.header("PRIVATE-TOKEN"), Some("glpat"));
    assert_eq!(post.body.unwrap()["content"], "name: fresh\n");
}
