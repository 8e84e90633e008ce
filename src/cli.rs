//! Command-line interface definitions.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Keep dotfiles in a repository and link them back into $HOME",
    version
)]
pub struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Repository location (repeatable; defaults to the configured repos)
    #[arg(
        short = 'r',
        long = "repo",
        global = true,
        env = "DOTLINK_REPOS",
        value_delimiter = ','
    )]
    pub repos: Vec<PathBuf>,

    /// Override the home directory
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Configuration file (default: $XDG_CONFIG_HOME/dotlink/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Create symlinks relative to their directory
    #[arg(long, global = true)]
    pub relative: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add dotfiles to the repository
    Add(AddOpts),
    /// Stop tracking dotfiles and restore them into $HOME
    Remove(RemoveOpts),
    /// Link repository dotfiles into $HOME
    Enable(EnableOpts),
    /// Unlink dotfiles from $HOME, keeping the repository copy
    Disable(DisableOpts),
    /// Re-link missing (and, with --force, conflicting) dotfiles
    Sync(SyncOpts),
    /// Show the state of repository dotfiles
    Status(StatusOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Enable(_) => "enable",
            Self::Disable(_) => "disable",
            Self::Sync(_) => "sync",
            Self::Status(_) => "status",
            Self::Version => "version",
        }
    }
}

/// Dry-run flag shared by the mutating commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DryRunOpt {
    /// Show what would be executed without changing anything
    #[arg(short = 'd', long = "dry-run", visible_alias = "debug")]
    pub dry_run: bool,
}

/// Files to operate on, or every dotfile in the repository.
#[derive(Args, Debug, Clone, Default)]
pub struct FileSelection {
    /// Operate on every dotfile in the repository
    #[arg(short, long, conflicts_with = "files")]
    pub all: bool,

    /// Dotfiles (paths in $HOME); directories are expanded
    #[arg(required_unless_present = "all")]
    pub files: Vec<PathBuf>,
}

/// Options for the `add` subcommand.
#[derive(Args, Debug, Clone)]
pub struct AddOpts {
    /// Dry-run flag.
    #[command(flatten)]
    pub dry_run: DryRunOpt,

    /// Copy files into the repository instead of moving and linking them
    #[arg(short, long)]
    pub copy: bool,

    /// Dotfiles to add (paths in $HOME); directories are expanded
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Options for the `remove` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RemoveOpts {
    /// Dry-run flag.
    #[command(flatten)]
    pub dry_run: DryRunOpt,

    /// Which dotfiles to remove.
    #[command(flatten)]
    pub selection: FileSelection,
}

/// Options for the `enable` subcommand.
#[derive(Args, Debug, Clone)]
pub struct EnableOpts {
    /// Dry-run flag.
    #[command(flatten)]
    pub dry_run: DryRunOpt,

    /// Place regular copies instead of symlinks
    #[arg(short, long)]
    pub copy: bool,

    /// Which dotfiles to enable.
    #[command(flatten)]
    pub selection: FileSelection,
}

/// Options for the `disable` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DisableOpts {
    /// Dry-run flag.
    #[command(flatten)]
    pub dry_run: DryRunOpt,

    /// Which dotfiles to disable.
    #[command(flatten)]
    pub selection: FileSelection,
}

/// Options for the `sync` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncOpts {
    /// Dry-run flag.
    #[command(flatten)]
    pub dry_run: DryRunOpt,

    /// Place regular copies instead of symlinks
    #[arg(short, long)]
    pub copy: bool,

    /// Overwrite conflicting files in $HOME
    #[arg(short, long, visible_alias = "forced")]
    pub force: bool,
}

/// Options for the `status` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct StatusOpts {
    /// Show every dotfile, not only missing and conflicting ones
    #[arg(short, long)]
    pub all: bool,

    /// Print a JSON array instead of text
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_add_with_files() {
        let cli = Cli::parse_from(["dotlink", "add", "~/.vimrc", "~/.bashrc"]);
        let Command::Add(opts) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(
            opts.files,
            vec![PathBuf::from("~/.vimrc"), PathBuf::from("~/.bashrc")]
        );
        assert!(!opts.copy);
        assert!(!opts.dry_run.dry_run);
    }

    #[test]
    fn add_requires_files() {
        assert!(Cli::try_parse_from(["dotlink", "add"]).is_err());
    }

    #[test]
    fn parse_dry_run_and_debug_alias() {
        for flag in ["-d", "--dry-run", "--debug"] {
            let cli = Cli::parse_from(["dotlink", "disable", flag, "--all"]);
            let Command::Disable(opts) = cli.command else {
                panic!("expected disable");
            };
            assert!(opts.dry_run.dry_run, "{flag} should enable dry run");
        }
    }

    #[test]
    fn remove_without_files_requires_all() {
        assert!(Cli::try_parse_from(["dotlink", "remove"]).is_err());
        let cli = Cli::parse_from(["dotlink", "remove", "--all"]);
        let Command::Remove(opts) = cli.command else {
            panic!("expected remove");
        };
        assert!(opts.selection.all);
    }

    #[test]
    fn all_conflicts_with_files() {
        assert!(Cli::try_parse_from(["dotlink", "enable", "--all", "~/.vimrc"]).is_err());
    }

    #[test]
    fn parse_sync_force_copy() {
        let cli = Cli::parse_from(["dotlink", "sync", "-f", "-c"]);
        let Command::Sync(opts) = cli.command else {
            panic!("expected sync");
        };
        assert!(opts.force);
        assert!(opts.copy);
    }

    #[test]
    fn parse_repeated_repos() {
        let cli = Cli::parse_from(["dotlink", "-r", "~/a", "--repo", "~/b", "status"]);
        assert_eq!(
            cli.global.repos,
            vec![PathBuf::from("~/a"), PathBuf::from("~/b")]
        );
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::parse_from(["dotlink", "status", "--all", "--json"]);
        let Command::Status(opts) = cli.command else {
            panic!("expected status");
        };
        assert!(opts.all);
        assert!(opts.json);
    }

    #[test]
    fn parse_verbose_and_home() {
        let cli = Cli::parse_from(["dotlink", "-v", "--home", "/tmp/h", "version"]);
        assert!(cli.verbose);
        assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/h")));
        assert_eq!(cli.command.name(), "version");
    }
}
