//! Command: re-establish missing and conflicting dotfiles.
use anyhow::Result;

use super::{CommandSetup, Verb};
use crate::cli::{GlobalOpts, SyncOpts};
use crate::dotfile::{Dotfile, StateCode};
use crate::error::DotfileError;
use crate::logging::{FileStatus, Log};

/// Run the sync command.
///
/// Missing dotfiles are always synced. Conflicting ones are synced only
/// with `--force`, which discards the home copy; otherwise each is recorded
/// as skipped.
///
/// # Errors
///
/// Returns an error if setup fails, a state cannot be read, or an operation
/// fails with anything other than a per-file refusal.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let repo = setup.repos.single()?;
    let ops = setup.operations(repo, opts.dry_run.dry_run, log);

    log.stage("Checking dotfiles");
    let mut missing = Vec::new();
    let mut conflicts = Vec::new();
    for dotfile in repo.contents()? {
        match dotfile.state()?.code {
            StateCode::Missing => missing.push(dotfile),
            StateCode::Conflict => conflicts.push(dotfile),
            StateCode::Link | StateCode::Copy | StateCode::External => {}
        }
    }
    log.debug(&format!(
        "{} missing, {} conflicting",
        missing.len(),
        conflicts.len()
    ));

    let missing_count = missing.len();
    let conflict_count = conflicts.len();
    let mut batch: Vec<Result<Dotfile, DotfileError>> = missing.into_iter().map(Ok).collect();
    if opts.force {
        batch.extend(conflicts.into_iter().map(Ok));
    } else {
        for dotfile in &conflicts {
            let name = dotfile.short_name(repo.home()).display().to_string();
            log.record(&name, FileStatus::Skipped, Some("conflict"));
        }
        if conflict_count > 0 {
            log.warn(&format!(
                "{conflict_count} conflicting file(s) not synced; overwrite them with --force"
            ));
        }
    }

    log.stage("Syncing dotfiles");
    super::perform(Verb::Sync { copy: opts.copy }, batch, repo, &ops)?;

    if !ops.is_dry_run() {
        if opts.force {
            log.info(&format!(
                "synchronized {missing_count} missing and {conflict_count} conflicting file(s)"
            ));
        } else {
            log.info(&format!("synchronized {missing_count} missing file(s)"));
        }
    }
    Ok(())
}
