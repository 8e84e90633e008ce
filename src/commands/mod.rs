//! Subcommand orchestration.
//!
//! Every mutating command resolves its repository through [`CommandSetup`]
//! and hands a batch of dotfiles to [`perform`], which is where per-file
//! refusals are caught so the rest of the batch still runs.
pub mod add;
pub mod disable;
pub mod enable;
pub mod remove;
pub mod status;
pub mod sync;
pub mod version;

use anyhow::{Context as _, Result};
use std::fmt;
use std::path::PathBuf;

use crate::cli::{FileSelection, GlobalOpts};
use crate::config::{self, Config};
use crate::dotfile::Dotfile;
use crate::error::DotfileError;
use crate::logging::{FileStatus, Log, Logger};
use crate::operations::Operations;
use crate::repository::{Repositories, Repository};

/// Shared state produced by the common command setup sequence.
///
/// Resolves the home directory, loads the configuration file, applies
/// command-line overrides, and opens the repositories.
#[derive(Debug)]
pub struct CommandSetup {
    /// Home directory dotfiles are linked into.
    pub home: PathBuf,
    /// Effective configuration after command-line overrides.
    pub config: Config,
    /// Repositories selected for this invocation.
    pub repos: Repositories,
}

impl CommandSetup {
    /// Load configuration and open the selected repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined, the
    /// configuration file fails to parse, or a repository cannot be opened.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let home = match &global.home {
            Some(home) => home.clone(),
            None => config::home_dir()?,
        };

        let config_path = global
            .config
            .clone()
            .unwrap_or_else(|| config::default_path(&home));
        log.debug(&format!("config: {}", config_path.display()));
        let mut config = Config::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;

        if !global.repos.is_empty() {
            config.repos.clone_from(&global.repos);
        }
        if global.relative {
            config.relative_symlinks = true;
        }

        let repos = Repositories::new(&config.repos, &home, &config.repository_settings(), log)?;
        for repo in &repos {
            log.debug(&format!("repository: {}", repo.path().display()));
        }

        Ok(Self {
            home,
            config,
            repos,
        })
    }

    /// Operations for one repository, honouring the dry-run flag.
    #[must_use]
    pub fn operations<'a>(
        &self,
        repo: &Repository,
        dry_run: bool,
        log: &'a dyn Log,
    ) -> Operations<'a> {
        Operations::new(repo.home(), log)
            .with_dry_run(dry_run)
            .with_relative_symlinks(self.config.relative_symlinks)
    }
}

/// The dotfiles a command was asked to operate on.
///
/// `--all` selects the whole repository; otherwise the given paths are
/// resolved, with rejected paths kept as errors for [`perform`] to report.
///
/// # Errors
///
/// Returns an error if the repository or a given directory cannot be walked.
pub fn select(
    repo: &Repository,
    selection: &FileSelection,
) -> Result<Vec<Result<Dotfile, DotfileError>>> {
    if selection.all {
        Ok(repo.contents()?.into_iter().map(Ok).collect())
    } else {
        repo.dotfiles(&selection.files)
    }
}

/// A dotfile operation applied by [`perform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// [`Dotfile::add`].
    Add {
        /// Copy instead of move-and-link.
        copy: bool,
    },
    /// [`Dotfile::remove`].
    Remove,
    /// [`Dotfile::enable`].
    Enable {
        /// Place a copy instead of a symlink.
        copy: bool,
    },
    /// [`Dotfile::disable`].
    Disable,
    /// [`Dotfile::sync`].
    Sync {
        /// Place a copy instead of a symlink.
        copy: bool,
    },
}

impl Verb {
    fn apply(self, dotfile: &Dotfile, ops: &Operations<'_>) -> Result<()> {
        match self {
            Self::Add { copy } => dotfile.add(ops, copy),
            Self::Remove => dotfile.remove(ops),
            Self::Enable { copy } => dotfile.enable(ops, copy),
            Self::Disable => dotfile.disable(ops),
            Self::Sync { copy } => dotfile.sync(ops, copy),
        }
    }

    /// Word used in success messages (`added ~/.vimrc`).
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Add { .. } => "added",
            Self::Remove => "removed",
            Self::Enable { .. } => "enabled",
            Self::Disable => "disabled",
            Self::Sync { .. } => "synced",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add { .. } => "add",
            Self::Remove => "remove",
            Self::Enable { .. } => "enable",
            Self::Disable => "disable",
            Self::Sync { .. } => "sync",
        })
    }
}

/// Apply `verb` to every dotfile in `batch`.
///
/// Each file is recorded in the summary. A [`DotfileError`], whether from
/// resolving the path or from the operation, is logged and the batch moves
/// on; any other error aborts the remaining files.
///
/// # Errors
///
/// Returns the first error that is not a [`DotfileError`].
pub fn perform(
    verb: Verb,
    batch: Vec<Result<Dotfile, DotfileError>>,
    repo: &Repository,
    ops: &Operations<'_>,
) -> Result<()> {
    let log = ops.log();
    for item in batch {
        let dotfile = match item {
            Ok(dotfile) => dotfile,
            Err(refusal) => {
                let name = refusal.path().display().to_string();
                reject(log, &name, &refusal);
                continue;
            }
        };

        let name = dotfile.short_name(repo.home()).display().to_string();
        match verb.apply(&dotfile, ops) {
            Ok(()) if ops.is_dry_run() => log.record(&name, FileStatus::DryRun, None),
            Ok(()) => {
                log.info(&format!("{} {name}", verb.past_tense()));
                log.record(&name, FileStatus::Ok, None);
            }
            Err(err) => match err.downcast_ref::<DotfileError>() {
                Some(refusal) => reject(log, &name, refusal),
                None => return Err(err.context(format!("{verb} {name}"))),
            },
        }
    }
    Ok(())
}

fn reject(log: &dyn Log, name: &str, refusal: &DotfileError) {
    let msg = refusal.to_string();
    log.error(&msg);
    log.record(name, FileStatus::Failed, Some(&msg));
}

/// Print the summary and fail if any file failed.
///
/// # Errors
///
/// Returns an error if one or more files recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} file(s) failed");
    }
    Ok(())
}
