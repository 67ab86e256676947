//! Resolve command implementation

use std::path::Path;

use colored::Colorize;
use recsync_core::Resolution;

use crate::error::Result;

/// Settle the conflict under `key` by keeping one side.
///
/// Works offline: the choice is written locally and published by the next
/// `recsync sync`.
pub fn run_resolve(path: &Path, key: &str, resolution: Resolution) -> Result<()> {
    let record = super::coordinator(path)?.resolve_conflict(key, resolution)?;

    println!(
        "{} Kept {} version of {}",
        "OK".green().bold(),
        resolution.to_string().cyan(),
        record.path.cyan()
    );
    if resolution == Resolution::Local {
        println!("Run {} to publish it.", "recsync sync".cyan());
    }
    Ok(())
}
