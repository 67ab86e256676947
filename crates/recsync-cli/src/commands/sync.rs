//! Sync and push command implementations

use std::path::Path;

use colored::Colorize;
use recsync_core::SyncCycleResult;

use crate::error::{CliError, Result};

/// Run one sync cycle for the project at `path`.
///
/// A `token` overrides the stored one for this run only.
pub async fn run_sync(path: &Path, token: Option<&str>, json: bool) -> Result<()> {
    let coordinator = super::coordinator(path)?;

    let config = match (coordinator.stored_config()?, token) {
        (Some(config), Some(token)) => Some(config.with_token(token)),
        (None, Some(_)) => return Err(no_remote()),
        (_, None) => None,
    };

    if !json {
        println!("{} Syncing {}...", "=>".blue().bold(), path.display());
    }
    let result = coordinator.sync_project(config.as_ref()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    outcome(&result)
}

/// Publish `paths` as they are on disk, skipping the merge.
pub async fn run_push(path: &Path, paths: &[String], token: Option<&str>) -> Result<()> {
    let coordinator = super::coordinator(path)?;
    let mut config = coordinator.stored_config()?.ok_or_else(no_remote)?;
    if let Some(token) = token {
        config = config.with_token(token);
    }

    let results = coordinator.push_paths(&config, paths).await?;
    let mut failed = 0;
    for result in &results {
        if result.ok {
            println!("   {} {}", ">".green(), result.path.cyan());
        } else {
            failed += 1;
            println!(
                "   {} {}: {}",
                "!".red(),
                result.path.cyan(),
                result.message.as_deref().unwrap_or_default()
            );
        }
    }
    if results.len() < paths.len() {
        println!(
            "{} {} path(s) had no local file and were skipped.",
            "NOTE".yellow().bold(),
            paths.len() - results.len()
        );
    }

    if failed > 0 {
        return Err(CliError::user(format!("{failed} file(s) failed to push")));
    }
    Ok(())
}

fn no_remote() -> CliError {
    CliError::user("No remote configured. Run 'recsync config set' first.")
}

fn print_report(result: &SyncCycleResult) {
    if result.is_no_op() {
        println!(
            "{} No remote configured. Run {} to set one.",
            "SKIP".yellow().bold(),
            "recsync config set".cyan()
        );
        return;
    }
    if let Some(reason) = &result.aborted {
        println!("{} Stopped while {}: {}", "ABORTED".red().bold(), result.state, reason);
        return;
    }

    for path in &result.applied {
        println!("   {} {}", "<".green(), path.cyan());
    }
    for path in result.pushed() {
        println!("   {} {}", ">".green(), path.cyan());
    }
    for failed in result.failed_pushes() {
        let failure = failed
            .failure
            .map(|f| f.to_string())
            .unwrap_or_else(|| "failed".to_string());
        println!(
            "   {} {} ({}): {}",
            "!".red(),
            failed.path.cyan(),
            failure.yellow(),
            failed.message.as_deref().unwrap_or_default()
        );
    }
    for key in &result.conflicts {
        println!("   {} {}", "x".red(), key.cyan());
    }

    if result.needs_init {
        println!(
            "{} Remote branch is empty or missing and needs initialization.",
            "NOTE".yellow().bold()
        );
    }

    if result.conflicts.is_empty() {
        println!(
            "{} {} file(s) in sync, {} pulled, {} pushed.",
            "OK".green().bold(),
            result.resolved.len(),
            result.applied.len(),
            result.pushed().len()
        );
    } else {
        println!(
            "{} {} conflict(s); nothing was pushed. Run {} to review.",
            "CONFLICTS".red().bold(),
            result.conflicts.len(),
            "recsync status".cyan()
        );
    }
}

/// Exit status: aborted cycles and failed pushes are errors, conflicts are not.
fn outcome(result: &SyncCycleResult) -> Result<()> {
    if let Some(reason) = &result.aborted {
        return Err(CliError::user(format!("sync aborted: {reason}")));
    }
    let failed = result.failed_pushes().len();
    if failed > 0 {
        return Err(CliError::user(format!("{failed} file(s) failed to push")));
    }
    Ok(())
}
