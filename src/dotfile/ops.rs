//! The mutating operations on a [`Dotfile`].
//!
//! Each operation validates with explicit pre-checks first, raising a
//! [`DotfileError`] before anything is touched, then issues its mutations
//! through [`Operations`] so that a dry run only reports them.
use anyhow::{Result, bail};
use std::path::Path;

use super::{Dotfile, StateCode};
use crate::error::DotfileError;
use crate::fs;
use crate::operations::{Action, Operations};

impl Dotfile {
    /// Start tracking the file at `name`.
    ///
    /// In link mode the file is moved to `target` and `name` becomes a
    /// symlink to it. If `name` is already a symlink to some other file,
    /// that file's contents are copied into `target` and the old link is
    /// replaced. In copy mode `name` is left alone and its contents are
    /// copied to `target`.
    ///
    /// # Errors
    ///
    /// - [`DotfileError::NotFound`] if nothing is at `name`.
    /// - [`DotfileError::Dangling`] if `name` is a symlink to nothing.
    /// - [`DotfileError::IsDirectory`] if `name` is a directory.
    /// - [`DotfileError::InRepository`] if `name` already links to `target`.
    /// - [`DotfileError::TargetExists`] if `target` is occupied (link mode).
    /// - [`DotfileError::IsSymlink`] or [`DotfileError::SameFile`] in copy mode.
    /// - Any I/O failure while mutating.
    pub fn add(&self, ops: &Operations<'_>, copy: bool) -> Result<()> {
        if !fs::lexists(&self.name) {
            bail!(DotfileError::NotFound(self.name.clone()));
        }
        if fs::is_symlink(&self.name) && !self.name.exists() {
            bail!(DotfileError::Dangling(self.name.clone()));
        }

        if copy {
            if self.name.is_dir() && !fs::is_symlink(&self.name) {
                bail!(DotfileError::IsDirectory(self.name.clone()));
            }
            return self.copy_to_repository(ops);
        }

        if self.is_present() {
            bail!(DotfileError::InRepository(self.name.clone()));
        }
        if self.name.is_dir() {
            bail!(DotfileError::IsDirectory(self.name.clone()));
        }
        if fs::lexists(&self.target) {
            bail!(DotfileError::TargetExists(self.target.clone()));
        }

        self.ensure_dirs(ops)?;
        if !fs::is_symlink(&self.name) {
            ops.run(Action::Move {
                from: &self.name,
                to: &self.target,
            })?;
        }
        self.link(ops, false)
    }

    /// Stop tracking: drop the symlink at `name` and move the repository
    /// copy back in its place.
    ///
    /// A failure between the two steps leaves the file only in the
    /// repository.
    ///
    /// # Errors
    ///
    /// - [`DotfileError::NotASymlink`] if `name` is not a symlink.
    /// - [`DotfileError::TargetMissing`] if `target` is not a regular file.
    /// - Any I/O failure while mutating.
    pub fn remove(&self, ops: &Operations<'_>) -> Result<()> {
        if !fs::is_symlink(&self.name) {
            bail!(DotfileError::NotASymlink(self.name.clone()));
        }
        if !self.target.is_file() {
            bail!(DotfileError::TargetMissing(self.target.clone()));
        }

        ops.run(Action::Unlink(&self.name))?;
        ops.run(Action::Move {
            from: &self.target,
            to: &self.name,
        })
    }

    /// Put a file that is already in the repository back into the home
    /// directory, as a symlink or (in copy mode) as a regular copy.
    ///
    /// A dangling symlink at `name` does not count as existing; it is
    /// replaced.
    ///
    /// # Errors
    ///
    /// - [`DotfileError::Exists`] if `name` already exists.
    /// - [`DotfileError::TargetMissing`] if `target` does not exist.
    /// - Any I/O failure while mutating.
    pub fn enable(&self, ops: &Operations<'_>, copy: bool) -> Result<()> {
        if self.name.exists() {
            bail!(DotfileError::Exists(self.name.clone()));
        }
        if !self.target.exists() {
            bail!(DotfileError::TargetMissing(self.target.clone()));
        }

        self.ensure_dirs(ops)?;
        if copy {
            self.materialize(ops, false)
        } else {
            self.link(ops, false)
        }
    }

    /// Remove the symlink at `name`, leaving the repository copy alone, then
    /// prune home directories that became empty.
    ///
    /// Pruning is best effort: its failures are logged at debug level and
    /// do not fail the operation.
    ///
    /// # Errors
    ///
    /// - [`DotfileError::NotASymlink`] if `name` is not a symlink.
    /// - [`DotfileError::TargetMissing`] if `name` resolves but `target` is gone.
    /// - A plain error if `name` resolves to a file other than `target`;
    ///   unlinking it would drop a link this tool does not manage.
    /// - Any I/O failure while unlinking.
    pub fn disable(&self, ops: &Operations<'_>) -> Result<()> {
        if !fs::is_symlink(&self.name) {
            bail!(DotfileError::NotASymlink(self.name.clone()));
        }
        if self.name.exists() {
            if !self.target.exists() {
                bail!(DotfileError::TargetMissing(self.target.clone()));
            }
            if !fs::same_file(&self.name, &self.target) {
                bail!(
                    "'{}' does not point to '{}'; refusing to unlink it",
                    self.name.display(),
                    self.target.display()
                );
            }
        }

        ops.run(Action::Unlink(&self.name))?;
        if let Err(err) = ops.prune_empty_ancestors(&self.name) {
            ops.log()
                .debug(&format!("could not prune above {}: {err:#}", self.name.display()));
        }
        Ok(())
    }

    /// Re-establish a `missing` or `conflict` dotfile.
    ///
    /// On a conflict the home copy is discarded: in link mode it is unlinked
    /// before the symlink is created, in copy mode it is overwritten with
    /// the repository contents. Whether conflicts are synced at all is the
    /// caller's decision.
    ///
    /// # Errors
    ///
    /// - A plain error if the state is anything other than `missing` or
    ///   `conflict`; callers are expected to filter with [`Dotfile::state`].
    /// - [`DotfileError::TargetMissing`] if `target` does not exist.
    /// - [`DotfileError::IsDirectory`] if `name` is a real directory.
    /// - Any I/O failure while mutating.
    pub fn sync(&self, ops: &Operations<'_>, copy: bool) -> Result<()> {
        let state = self.state()?;
        if !state.code.is_syncable() {
            bail!(
                "cannot sync '{}': state is {}, expected missing or conflict",
                self.name.display(),
                state.code
            );
        }
        if !self.target.exists() {
            bail!(DotfileError::TargetMissing(self.target.clone()));
        }
        if self.name.is_dir() && !fs::is_symlink(&self.name) {
            bail!(DotfileError::IsDirectory(self.name.clone()));
        }

        let mut name_removed = false;
        if state.code == StateCode::Conflict && !copy {
            ops.run(Action::Unlink(&self.name))?;
            name_removed = true;
        }

        self.ensure_dirs(ops)?;
        if copy {
            self.materialize(ops, name_removed)
        } else {
            self.link(ops, name_removed)
        }
    }

    /// Create the parent directories of `name` and `target`.
    fn ensure_dirs(&self, ops: &Operations<'_>) -> Result<()> {
        for path in [&self.name, &self.target] {
            if let Some(parent) = path.parent() {
                ops.ensure_dir(parent)?;
            }
        }
        Ok(())
    }

    /// Make `name` a symlink to `target`.
    ///
    /// An existing symlink at `name` is replaced; if it resolved to a real
    /// file other than `target`, that file's contents are copied into
    /// `target` first. `name_removed` tells a dry run that an earlier
    /// reported step already unlinked `name`.
    fn link(&self, ops: &Operations<'_>, name_removed: bool) -> Result<()> {
        if !name_removed && fs::is_symlink(&self.name) {
            if let Some(real) = fs::resolve(&self.name)
                && !fs::same_file(&real, &self.target)
            {
                ops.run(Action::Copy {
                    from: &real,
                    to: &self.target,
                })?;
            }
            ops.run(Action::Unlink(&self.name))?;
        }

        let parent = self.name.parent().unwrap_or_else(|| Path::new("/"));
        ops.ensure_dir(parent)?;
        let points_to = if ops.relative_symlinks() {
            fs::relative_path(&self.target, parent)
        } else {
            self.target.clone()
        };
        ops.run(Action::Link {
            link: &self.name,
            points_to: &points_to,
        })
    }

    /// Copy the home file into the repository.
    fn copy_to_repository(&self, ops: &Operations<'_>) -> Result<()> {
        if fs::is_symlink(&self.name) {
            bail!(DotfileError::IsSymlink(self.name.clone()));
        }
        if fs::same_file(&self.name, &self.target) {
            bail!(DotfileError::SameFile(self.name.clone()));
        }

        self.ensure_dirs(ops)?;
        ops.run(Action::Copy {
            from: &self.name,
            to: &self.target,
        })
    }

    /// Write the repository file to `name` as a regular copy.
    ///
    /// A symlink at `name` is unlinked first so the copy never writes
    /// through it.
    fn materialize(&self, ops: &Operations<'_>, name_removed: bool) -> Result<()> {
        if !name_removed {
            if fs::is_symlink(&self.name) {
                ops.run(Action::Unlink(&self.name))?;
            } else if fs::same_file(&self.name, &self.target) {
                bail!(DotfileError::SameFile(self.name.clone()));
            }
        }

        ops.run(Action::Copy {
            from: &self.target,
            to: &self.name,
        })
    }
}
