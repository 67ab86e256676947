//! Show command implementation

use std::path::Path;

use colored::Colorize;
use recsync_content::{FieldChange, SemanticDiff, format, unified};
use recsync_core::{ConflictRecord, ConflictStore};
use recsync_fs::DirStore;

use crate::error::{CliError, Result};

/// Print one conflict: its metadata, the field changes, and a line diff
/// from local to remote.
pub fn run_show(path: &Path, key: &str) -> Result<()> {
    let store = DirStore::new(path);
    let state = ConflictStore::new(&store).load()?;
    let record = state
        .lookup(key)
        .ok_or_else(|| CliError::user(format!("No conflict recorded under '{key}'")))?;

    println!("{} {}", "Conflict".bold(), key.cyan());
    println!();
    println!("  {:<12} {}", "Path:".dimmed(), record.path);
    println!("  {:<12} {}", "Format:".dimmed(), record.format);
    println!("  {:<12} {}", "Reason:".dimmed(), record.reason().unwrap_or("unknown"));
    if let Some(at) = record.conflict_at().filter(|at| !at.is_empty()) {
        println!("  {:<12} {}", "At:".dimmed(), at);
    }
    println!("  {:<12} {}", "Recorded:".dimmed(), record.timestamp);
    println!();

    let changes = field_changes(record);
    if !changes.is_empty() {
        println!("{}:", "Fields".bold());
        for change in &changes {
            println!("  {}", describe(change));
        }
        println!();
    }

    println!("{}:", "Diff".bold());
    match (&record.local, &record.remote) {
        (Some(local), Some(remote)) => {
            for line in unified(local, remote, "local", "remote").lines() {
                println!("{}", colorize(line));
            }
        }
        (Some(_), None) => println!("  {}", "deleted on remote".yellow()),
        (None, Some(_)) => println!("  {}", "deleted locally".yellow()),
        (None, None) => println!("  {}", "deleted on both sides".dimmed()),
    }

    Ok(())
}

fn field_changes(record: &ConflictRecord) -> Vec<FieldChange> {
    if !record.format.is_structured() {
        return Vec::new();
    }
    let parse = |side: &Option<String>| {
        side.as_deref()
            .and_then(|text| format::parse(record.format, text).ok())
    };
    match (parse(&record.local), parse(&record.remote)) {
        (Some(local), Some(remote)) => SemanticDiff::compute(&local, &remote).changes,
        _ => Vec::new(),
    }
}

fn describe(change: &FieldChange) -> String {
    match change {
        FieldChange::Added { path, value } => format!("{} {} = {}", "+".green(), path, value),
        FieldChange::Removed { path, value } => format!("{} {} = {}", "-".red(), path, value),
        FieldChange::Modified { path, old, new } => {
            format!("{} {}: {} -> {}", "~".yellow(), path, old, new)
        }
    }
}

fn colorize(line: &str) -> String {
    if line.starts_with("+++") || line.starts_with("---") {
        line.bold().to_string()
    } else if line.starts_with('+') {
        line.green().to_string()
    } else if line.starts_with('-') {
        line.red().to_string()
    } else if line.starts_with("@@") {
        line.cyan().to_string()
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_core::{FileTriple, run_threeway};
    use recsync_test_utils::TestProject;

    #[test]
    fn unknown_key_is_a_user_error() {
        let project = TestProject::new();
        let err = run_show(project.root(), "missing").unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn structured_conflict_lists_changed_fields() {
        let outcome = run_threeway(&[FileTriple::new("a.json")
            .with_base("{\"v\":1,\"n\":\"x\"}")
            .with_local("{\"v\":2,\"n\":\"x\"}")
            .with_remote("{\"v\":3,\"n\":\"x\"}")]);
        let record = &outcome.conflicts["a.json"];

        let changes = field_changes(record);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path(), "v");
    }
}
