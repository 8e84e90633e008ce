//! Command: unlink dotfiles from the home directory.
use anyhow::Result;

use super::{CommandSetup, Verb};
use crate::cli::{DisableOpts, GlobalOpts};
use crate::logging::Log;

/// Run the disable command.
///
/// # Errors
///
/// Returns an error if setup fails or an operation fails with anything other
/// than a per-file refusal.
pub fn run(global: &GlobalOpts, opts: &DisableOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let repo = setup.repos.single()?;
    let ops = setup.operations(repo, opts.dry_run.dry_run, log);

    log.stage(&format!("Disabling from {}", repo.path().display()));
    let batch = super::select(repo, &opts.selection)?;
    super::perform(Verb::Disable, batch, repo, &ops)
}
