//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use recsync_core::Resolution;
use recsync_remote::Provider;

/// recsync - Keep JSON, YAML, and text records in sync with a Git hosting remote
#[derive(Parser, Debug)]
#[command(name = "recsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the nearest one holding .repo-sync)
    #[arg(short = 'C', long, global = true)]
    pub project: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Pull, merge, and push the project once
    Sync {
        /// Access token, overriding the stored one
        #[arg(long, env = "RECSYNC_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output the cycle result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish local files without merging first
    Push {
        /// Record paths relative to the project root
        #[arg(required = true)]
        paths: Vec<String>,

        /// Access token, overriding the stored one
        #[arg(long, env = "RECSYNC_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// List open conflicts
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one conflict with a diff of both sides
    Show {
        /// Conflict key (natural id or path)
        key: String,
    },

    /// Resolve a conflict by keeping one side
    ///
    /// Examples:
    ///   recsync resolve rec-42 --take local
    ///   recsync resolve notes/todo.md --take remote
    Resolve {
        /// Conflict key (natural id or path)
        key: String,

        /// Which side to keep
        #[arg(long, value_enum)]
        take: Side,
    },

    /// Merge three files offline and print the result
    ///
    /// A path that does not exist is treated as an absent side.
    Merge {
        base: PathBuf,
        local: PathBuf,
        remote: PathBuf,
    },

    /// Show or change the remote configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Side of a conflict to keep
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

impl From<Side> for Resolution {
    fn from(side: Side) -> Self {
        match side {
            Side::Local => Resolution::Local,
            Side::Remote => Resolution::Remote,
        }
    }
}

/// Remote configuration actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Store the remote repository for this project
    ///
    /// Examples:
    ///   recsync config set github acme records
    ///   recsync config set gitlab acme/team records --host gitlab.example.com
    Set {
        /// Hosting provider (github or gitlab)
        provider: Provider,

        /// Repository owner, user, or group
        owner: String,

        /// Repository name
        repository: String,

        /// Branch to sync with
        #[arg(short, long)]
        branch: Option<String>,

        /// API host for self-hosted instances
        #[arg(long)]
        host: Option<String>,

        /// Access token
        #[arg(long, env = "RECSYNC_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Display the stored remote configuration
    Show {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from(["recsync"]);
        assert!(!cli.verbose);
        assert!(cli.project.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_project_flag() {
        let cli = Cli::parse_from(["recsync", "-C", "/tmp/p", "status"]);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.command, Some(Commands::Status { json: false }));
    }

    #[test]
    fn parse_resolve_command() {
        let cli = Cli::parse_from(["recsync", "resolve", "rec-1", "--take", "remote"]);
        assert_eq!(
            cli.command,
            Some(Commands::Resolve {
                key: "rec-1".into(),
                take: Side::Remote
            })
        );
    }

    #[test]
    fn resolve_requires_a_side() {
        assert!(Cli::try_parse_from(["recsync", "resolve", "rec-1"]).is_err());
        assert!(Cli::try_parse_from(["recsync", "resolve", "rec-1", "--take", "both"]).is_err());
    }

    #[test]
    fn parse_config_set() {
        let cli = Cli::parse_from([
            "recsync", "config", "set", "gitlab", "acme/team", "records", "--branch", "dev",
            "--token", "glpat",
        ]);
        match cli.command {
            Some(Commands::Config {
                action:
                    ConfigAction::Set {
                        provider,
                        owner,
                        branch,
                        token,
                        host,
                        ..
                    },
            }) => {
                assert_eq!(provider, Provider::Gitlab);
                assert_eq!(owner, "acme/team");
                assert_eq!(branch.as_deref(), Some("dev"));
                assert_eq!(token.as_deref(), Some("glpat"));
                assert!(host.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn push_requires_paths() {
        assert!(Cli::try_parse_from(["recsync", "push"]).is_err());
        let cli = Cli::parse_from(["recsync", "push", "a.json", "b.yaml", "--token", "t"]);
        assert_eq!(
            cli.command,
            Some(Commands::Push {
                paths: vec!["a.json".into(), "b.yaml".into()],
                token: Some("t".into()),
            })
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["recsync", "config", "set", "bitbucket", "a", "b"]).is_err());
    }

    #[test]
    fn parse_merge_command() {
        let cli = Cli::parse_from(["recsync", "merge", "b.json", "l.json", "r.json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Merge {
                base: "b.json".into(),
                local: "l.json".into(),
                remote: "r.json".into(),
            })
        );
    }
}
