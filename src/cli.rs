use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the workstation engine.
#[derive(Parser, Debug)]
#[command(
    name = "workstation",
    about = "Workstation setup: config registries, encrypted credentials, dev environments",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    #[allow(missing_docs)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override repository root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Fail entries whose target references an undefined variable
    #[arg(long, global = true)]
    pub strict: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install and verify configuration registries
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage encrypted credential environments
    #[command(subcommand)]
    Creds(CredsCommand),
    /// Manage development environments
    #[command(subcommand)]
    Env(EnvCommand),
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Creds(_) => "creds",
            Self::Env(_) => "env",
            Self::Version => "version",
        }
    }

    /// Whether stdout is meant for the shell (`eval`, `source`, `$(...)`),
    /// so log output must stay off it.
    #[must_use]
    pub const fn stdout_is_payload(&self) -> bool {
        matches!(
            self,
            Self::Creds(CredsCommand::Load { .. } | CredsCommand::Get { .. })
                | Self::Env(EnvCommand::Activate { .. })
        )
    }
}

/// `config` verbs.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Apply every entry of a registry
    Install {
        /// Registry name
        registry: String,
    },
    /// Verify a registry without changing anything
    Check {
        /// Registry name
        registry: String,
    },
    /// Offer existing dotfiles for adoption into the repository
    Scan,
    /// List available registries
    List,
}

/// `creds` verbs.
#[derive(Subcommand, Debug, Clone)]
pub enum CredsCommand {
    /// List credential environments
    Environments,
    /// Create an empty credential environment
    CreateEnv {
        /// Environment name
        name: Option<String>,
    },
    /// List keys with masked values
    List {
        /// Environment (default: main)
        env: Option<String>,
    },
    /// Add or replace a key
    Add {
        /// Key name
        key: String,
        /// Value
        value: String,
        /// Environment (default: main)
        env: Option<String>,
    },
    /// Print the value of a key
    Get {
        /// Key name
        key: String,
        /// Environment (default: main)
        env: Option<String>,
    },
    /// Delete a key
    Remove {
        /// Key name
        key: String,
        /// Environment (default: main)
        env: Option<String>,
    },
    /// Print export statements; use with eval "$(workstation creds load)"
    Load {
        /// Only keys containing this substring
        filter: Option<String>,
        /// Environment (default: main)
        env: Option<String>,
    },
    /// Write KEY=VALUE lines to a file (mode 0600)
    Export {
        /// Output file
        file: PathBuf,
        /// Only keys containing this substring
        filter: Option<String>,
        /// Environment (default: main)
        env: Option<String>,
    },
    /// Copy keys from one environment into another
    Copy {
        /// Source environment
        source: String,
        /// Target environment
        target: String,
        /// Only keys containing this substring
        filter: Option<String>,
    },
}

/// `env` verbs.
#[derive(Subcommand, Debug, Clone)]
pub enum EnvCommand {
    /// Create a development environment
    Create {
        /// Environment name
        name: Option<String>,
        /// python, node, cpp or generic
        kind: Option<String>,
    },
    /// List development environments
    List,
    /// Print the activation script path; use with . "$(workstation env activate NAME)"
    Activate {
        /// Environment name
        name: Option<String>,
    },
    /// Delete a development environment
    Remove {
        /// Environment name
        name: Option<String>,
    },
    /// Run a command inside an environment
    Run {
        /// Environment name
        name: String,
        /// Command and arguments
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Create an environment with starter project files
    Scaffold {
        /// python, node, cpp or generic
        kind: String,
        /// Environment name
        name: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_config_install_with_root() {
        let cli = Cli::parse_from(["workstation", "--root", "/repo", "config", "install", "shell"]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/repo")));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Install { ref registry }) if registry == "shell"
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["workstation", "config", "check", "shell", "--strict", "-v"]);
        assert!(cli.global.strict);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_creds_add_with_env() {
        let cli = Cli::parse_from(["workstation", "creds", "add", "OPENAI_API_KEY", "sk-test", "ai-tools"]);
        let Command::Creds(CredsCommand::Add { key, value, env }) = cli.command else {
            panic!("expected creds add");
        };
        assert_eq!(key, "OPENAI_API_KEY");
        assert_eq!(value, "sk-test");
        assert_eq!(env.as_deref(), Some("ai-tools"));
    }

    #[test]
    fn parse_creds_copy_with_filter() {
        let cli = Cli::parse_from(["workstation", "creds", "copy", "main", "ai-tools", "OPENAI"]);
        assert!(matches!(
            cli.command,
            Command::Creds(CredsCommand::Copy { ref filter, .. }) if filter.as_deref() == Some("OPENAI")
        ));
    }

    #[test]
    fn parse_creds_create_env_name_optional() {
        let cli = Cli::parse_from(["workstation", "creds", "create-env"]);
        assert!(matches!(
            cli.command,
            Command::Creds(CredsCommand::CreateEnv { name: None })
        ));
    }

    #[test]
    fn parse_env_run_trailing_command() {
        let cli = Cli::parse_from(["workstation", "env", "run", "ml", "--", "pytest", "-q"]);
        let Command::Env(EnvCommand::Run { name, command }) = cli.command else {
            panic!("expected env run");
        };
        assert_eq!(name, "ml");
        assert_eq!(command, vec!["pytest", "-q"]);
    }

    #[test]
    fn env_run_requires_command() {
        assert!(Cli::try_parse_from(["workstation", "env", "run", "ml"]).is_err());
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["workstation", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.command.log_name(), "version");
    }

    #[test]
    fn payload_commands_keep_stdout_clean() {
        let load = Cli::parse_from(["workstation", "creds", "load", "AWS"]);
        assert!(load.command.stdout_is_payload());
        let activate = Cli::parse_from(["workstation", "env", "activate", "ml"]);
        assert!(activate.command.stdout_is_payload());
        let install = Cli::parse_from(["workstation", "config", "install", "shell"]);
        assert!(!install.command.stdout_is_payload());
    }
}
