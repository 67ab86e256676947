//! Status command implementation

use std::path::Path;

use colored::Colorize;
use recsync_core::ConflictStore;
use recsync_fs::DirStore;
use serde_json::json;

use crate::error::Result;

/// List the open conflicts of the project at `path`
pub fn run_status(path: &Path, json: bool) -> Result<()> {
    let store = DirStore::new(path);
    let state = ConflictStore::new(&store).load()?;

    if json {
        let conflicts: Vec<_> = state
            .conflicts
            .iter()
            .map(|(key, record)| {
                json!({
                    "key": key,
                    "path": record.path,
                    "format": record.format,
                    "reason": record.reason(),
                    "conflictAt": record.conflict_at(),
                    "fields": record.fields(),
                    "timestamp": record.timestamp,
                })
            })
            .collect();
        let output = json!({ "conflicts": conflicts, "resolved": state.resolved });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Sync Status".bold());
    println!();
    println!("{}:   {}", "Path".dimmed(), path.display());
    println!();

    println!("{}:", "Conflicts".bold());
    if state.is_empty() {
        println!("  {}", "None".dimmed());
    } else {
        for (key, record) in &state.conflicts {
            let reason = record.reason().unwrap_or("unknown");
            print!("  {} {} ({}, {})", "x".red(), key.cyan(), record.path, reason.yellow());
            match record.conflict_at() {
                Some(at) if !at.is_empty() => println!(" at {}", at),
                _ => println!(),
            }
            let fields = record.fields();
            if !fields.is_empty() {
                println!("      {}: {}", "fields".dimmed(), fields.join(", "));
            }
        }
        println!();
        println!(
            "Run {} to inspect, {} to settle.",
            "recsync show <key>".cyan(),
            "recsync resolve <key> --take local|remote".cyan()
        );
    }

    if !state.resolved.is_empty() {
        println!();
        println!("{}: {}", "Previously resolved".dimmed(), state.resolved.len());
    }

    Ok(())
}
