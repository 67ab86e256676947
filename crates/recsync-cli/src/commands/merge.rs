//! Offline merge of three files

use std::io::ErrorKind;
use std::path::Path;

use colored::Colorize;
use recsync_core::{FileTriple, SessionOutcome, run_threeway};

use crate::error::{CliError, Result};

/// Merge `base`, `local` and `remote`, printing the merged text to stdout.
///
/// The format follows the extension of `local`. A missing file is an
/// absent side. A conflict is reported and fails the command.
pub fn run_merge(base: &Path, local: &Path, remote: &Path) -> Result<()> {
    let outcome = merge_files(base, local, remote)?;

    if let Some((key, record)) = outcome.conflicts.iter().next() {
        eprintln!("{} {} ({})", "CONFLICT".red().bold(), key.cyan(), record.reason().unwrap_or("unknown"));
        if let Some(at) = record.conflict_at().filter(|at| !at.is_empty()) {
            eprintln!("   {} {}", "at".dimmed(), at);
        }
        for field in record.fields() {
            eprintln!("   {} {}", "~".yellow(), field);
        }
        return Err(CliError::user("files could not be merged"));
    }

    match outcome.merged.into_values().next().flatten() {
        Some(text) => print!("{text}"),
        None => eprintln!("{} merged result deletes the file", "NOTE".yellow().bold()),
    }
    Ok(())
}

fn merge_files(base: &Path, local: &Path, remote: &Path) -> Result<SessionOutcome> {
    let triple = FileTriple {
        path: local.to_string_lossy().replace('\\', "/"),
        base: read_side(base)?,
        local: read_side(local)?,
        remote: read_side(remote)?,
    };
    Ok(run_threeway(&[triple]))
}

fn read_side(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn disjoint_field_edits_merge() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", "{\"a\":1,\"b\":1}");
        let local = write(&dir, "local.json", "{\"a\":2,\"b\":1}");
        let remote = write(&dir, "remote.json", "{\"a\":1,\"b\":3}");

        let outcome = merge_files(&base, &local, &remote).unwrap();
        let merged: serde_json::Value =
            serde_json::from_str(outcome.merged.values().next().unwrap().as_deref().unwrap())
                .unwrap();
        assert_eq!(merged, serde_json::json!({"a": 2, "b": 3}));
    }

    #[test]
    fn missing_base_is_an_absent_side() {
        let dir = TempDir::new().unwrap();
        let local = write(&dir, "local.txt", "same");
        let remote = write(&dir, "remote.txt", "same");

        let outcome = merge_files(&dir.path().join("nope.txt"), &local, &remote).unwrap();
        assert!(outcome.is_clean());
    }

    #[test]
    fn divergent_edits_fail_the_command() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.txt", "x");
        let local = write(&dir, "local.txt", "y");
        let remote = write(&dir, "remote.txt", "z");

        assert!(run_merge(&base, &local, &remote).is_err());
    }
}
