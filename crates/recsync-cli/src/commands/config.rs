//! Remote configuration commands

use std::path::Path;

use colored::Colorize;
use recsync_fs::{DirStore, RecordStore};
use recsync_remote::RepoConfig;

use crate::error::{CliError, Result};

/// Store `config` as the project's remote.
///
/// A token already stored is kept when `config` carries none.
pub fn run_config_set(path: &Path, config: &RepoConfig) -> Result<()> {
    let store = DirStore::new(path);
    let mut config = config.clone();
    if config.token().is_none()
        && let Some(meta) = store.get_adapter()?
        && let Some(token) = meta.opt("token")
    {
        config = config.with_token(token);
    }

    store.set_adapter(&config.to_adapter())?;
    println!(
        "{} Remote set to {} {} ({})",
        "OK".green().bold(),
        config.provider.to_string().cyan(),
        config.project_path().cyan(),
        config.branch
    );
    if config.token().is_none() {
        println!(
            "{} No token stored. Pass {} or set {} before syncing.",
            "NOTE".yellow().bold(),
            "--token".cyan(),
            "RECSYNC_TOKEN".cyan()
        );
    }
    Ok(())
}

/// Display the stored remote configuration, token masked
pub fn run_config_show(path: &Path, json: bool) -> Result<()> {
    let store = DirStore::new(path);
    let config = match store.get_adapter()? {
        Some(meta) => RepoConfig::from_adapter(&meta)?,
        None => {
            return Err(CliError::user(
                "No remote configured. Run 'recsync config set' first.",
            ));
        }
    };
    let token = if config.token().is_some() { "set" } else { "not set" };

    if json {
        let mut output = serde_json::to_value(&config)?;
        output["token"] = serde_json::Value::from(token);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Remote Configuration".bold());
    println!();
    println!("  {:<12} {}", "Provider:".dimmed(), config.provider);
    println!("  {:<12} {}", "Project:".dimmed(), config.project_path());
    println!("  {:<12} {}", "Branch:".dimmed(), config.branch);
    if let Some(host) = &config.host {
        println!("  {:<12} {}", "Host:".dimmed(), host);
    }
    println!("  {:<12} {}", "Token:".dimmed(), token);
    if let Some(sha) = &config.last_synced_commit_sha {
        println!("  {:<12} {}", "Last sync:".dimmed(), sha);
    }
    Ok(())
}
