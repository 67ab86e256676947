//! recsync CLI
//!
//! Command-line front end for syncing a project's record files with a
//! GitHub or GitLab repository.

mod cli;
mod commands;
mod context;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands, ConfigAction};
use context::detect_project;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} record sync", "recsync".green().bold());
        println!();
        println!("Run {} for available commands.", "recsync --help".cyan());
        return Ok(());
    };

    let start = match cli.project {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    execute_command(command, start).await
}

/// Log to stderr when `--verbose` is given or `RUST_LOG` is set.
fn init_tracing(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => return,
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

async fn execute_command(cmd: Commands, start: PathBuf) -> Result<()> {
    let project = detect_project(&start);
    tracing::debug!(root = %project.root.display(), initialized = project.initialized, "Project detected");

    match cmd {
        Commands::Sync { token, json } => {
            commands::run_sync(&project.root, token.as_deref(), json).await
        }
        Commands::Push { paths, token } => {
            commands::run_push(&project.root, &paths, token.as_deref()).await
        }
        Commands::Status { json } => commands::run_status(&project.root, json),
        Commands::Show { key } => commands::run_show(&project.root, &key),
        Commands::Resolve { key, take } => {
            commands::run_resolve(&project.root, &key, take.into())
        }
        Commands::Merge {
            base,
            local,
            remote,
        } => commands::run_merge(&base, &local, &remote),
        Commands::Config { action } => match action {
            ConfigAction::Set {
                provider,
                owner,
                repository,
                branch,
                host,
                token,
            } => {
                let mut config = recsync_remote::RepoConfig::new(provider, owner, repository);
                if let Some(branch) = branch {
                    config = config.with_branch(branch);
                }
                if let Some(host) = host {
                    config = config.with_host(host);
                }
                if let Some(token) = token {
                    config = config.with_token(token);
                }
                commands::run_config_set(&project.root, &config)
            }
            ConfigAction::Show { json } => commands::run_config_show(&project.root, json),
        },
    }
}
