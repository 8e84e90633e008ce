//! Command: link repository dotfiles into the home directory.
use anyhow::Result;

use super::{CommandSetup, Verb};
use crate::cli::{EnableOpts, GlobalOpts};
use crate::logging::Log;

/// Run the enable command.
///
/// # Errors
///
/// Returns an error if setup fails or an operation fails with anything other
/// than a per-file refusal.
pub fn run(global: &GlobalOpts, opts: &EnableOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let repo = setup.repos.single()?;
    let ops = setup.operations(repo, opts.dry_run.dry_run, log);

    log.stage(&format!("Enabling from {}", repo.path().display()));
    let batch = super::select(repo, &opts.selection)?;
    super::perform(Verb::Enable { copy: opts.copy }, batch, repo, &ops)
}
