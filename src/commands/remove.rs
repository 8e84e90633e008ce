//! Command: stop tracking dotfiles.
use anyhow::Result;

use super::{CommandSetup, Verb};
use crate::cli::{GlobalOpts, RemoveOpts};
use crate::logging::Log;

/// Run the remove command, then prune directories the removals emptied.
///
/// Pruning is skipped in a dry run, where nothing was actually removed.
///
/// # Errors
///
/// Returns an error if setup fails, an operation fails with anything other
/// than a per-file refusal, or pruning fails.
pub fn run(global: &GlobalOpts, opts: &RemoveOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let repo = setup.repos.single()?;
    let ops = setup.operations(repo, opts.dry_run.dry_run, log);

    log.stage(&format!("Removing from {}", repo.path().display()));
    let batch = super::select(repo, &opts.selection)?;
    super::perform(Verb::Remove, batch, repo, &ops)?;

    if !ops.is_dry_run() {
        repo.prune(&ops)?;
    }
    Ok(())
}
