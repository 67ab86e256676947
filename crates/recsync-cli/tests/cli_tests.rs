//! Tests that run the compiled `recsync` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use recsync_test_utils::TestProject;

fn recsync() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("recsync"));
    cmd.env_remove("RECSYNC_TOKEN").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    recsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn no_command_prints_hint() {
    recsync()
        .assert()
        .success()
        .stdout(predicate::str::contains("recsync --help"));
}

#[test]
fn sync_without_remote_is_skipped() {
    let project = TestProject::new().with_file("a.json", "{}");
    recsync()
        .args(["sync"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("No remote configured"));
}

#[test]
fn config_round_trip() {
    let project = TestProject::new();
    recsync()
        .args(["config", "set", "gitlab", "acme/team", "records", "--token", "glpat"])
        .current_dir(project.root())
        .assert()
        .success();

    project.assert_file_contains(".repo-sync/adapter.json", "acme/team/records");

    recsync()
        .args(["config", "show", "--json"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gitlab\""))
        .stdout(predicate::str::contains("glpat").not());
}

#[test]
fn status_reports_no_conflicts() {
    let project = TestProject::new();
    recsync()
        .args(["-C"])
        .arg(project.root())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"conflicts\": []"));
}

#[test]
fn resolving_unknown_conflict_fails() {
    let project = TestProject::new();
    recsync()
        .args(["resolve", "rec-9", "--take", "local"])
        .current_dir(project.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("rec-9"));
}

#[test]
fn merge_prints_merged_text() {
    let project = TestProject::new()
        .with_file("base.md", "one\n")
        .with_file("local.md", "one\n")
        .with_file("remote.md", "two\n");
    recsync()
        .args(["merge", "base.md", "local.md", "remote.md"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout("two\n");
}

#[test]
fn merge_conflict_exits_nonzero() {
    let project = TestProject::new()
        .with_file("base.json", "{\"v\":1}")
        .with_file("local.json", "{\"v\":2}")
        .with_file("remote.json", "{\"v\":3}");
    recsync()
        .args(["merge", "base.json", "local.json", "remote.json"])
        .current_dir(project.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFLICT"));
}
