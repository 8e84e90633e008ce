//! Command: start tracking dotfiles.
use anyhow::Result;

use super::{CommandSetup, Verb};
use crate::cli::{AddOpts, GlobalOpts};
use crate::logging::Log;

/// Run the add command.
///
/// # Errors
///
/// Returns an error if setup fails or an operation fails with anything other
/// than a per-file refusal.
pub fn run(global: &GlobalOpts, opts: &AddOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let repo = setup.repos.single()?;
    let ops = setup.operations(repo, opts.dry_run.dry_run, log);

    log.stage(&format!("Adding to {}", repo.path().display()));
    let batch = repo.dotfiles(&opts.files)?;
    super::perform(Verb::Add { copy: opts.copy }, batch, repo, &ops)
}
