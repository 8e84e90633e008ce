//! A tracked configuration file: its home path, its repository path, and
//! the relationship between them.
//!
//! The mutating operations (`add`, `remove`, `enable`, `disable`, `sync`)
//! live in the `ops` submodule; [`State`] and [`StateCode`] in `state`.
mod ops;
mod state;

pub use state::{State, StateCode};

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::fs;

/// A configuration file managed within a repository.
///
/// A `Dotfile` is only a pair of paths. It owns no state of its own; every
/// query re-reads the filesystem, so values are cheap to build per
/// operation and can be discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dotfile {
    /// Live location in the home directory (`~/.vimrc`).
    pub name: PathBuf,
    /// Stored location in the repository (`~/Dotfiles/vimrc`).
    pub target: PathBuf,
}

impl Dotfile {
    /// Pair a home path with its repository path.
    ///
    /// Both paths should be absolute; comparisons never resolve them
    /// against the working directory.
    #[must_use]
    pub fn new(name: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }

    /// `name` relative to `home`, for display. Falls back to the full path
    /// when `name` is not below `home`.
    #[must_use]
    pub fn short_name(&self, home: &Path) -> &Path {
        self.name.strip_prefix(home).unwrap_or(&self.name)
    }

    /// Is `name` a symlink that already resolves to the repository copy?
    #[must_use]
    pub fn is_present(&self) -> bool {
        fs::is_symlink(&self.name)
            && fs::resolve(&self.name).is_some_and(|real| Some(real) == fs::resolve(&self.target))
    }

    /// Inspect the filesystem and classify this dotfile.
    ///
    /// The first matching rule wins:
    ///
    /// 1. `target` is a symlink: [`StateCode::External`].
    /// 2. `name` does not resolve to anything: [`StateCode::Missing`].
    /// 3. `target` does not exist: [`StateCode::Missing`] ("not in repository").
    /// 4. `name` is a symlink: [`StateCode::Link`] when it resolves to
    ///    `target`, otherwise [`StateCode::Conflict`].
    /// 5. `name` is a regular file whose contents differ from `target`:
    ///    [`StateCode::Conflict`], naming the side with the newer change time.
    /// 6. Otherwise [`StateCode::Copy`].
    ///
    /// The result is never cached. Nothing locks the two paths, so another
    /// process changing them between this call and a following operation
    /// invalidates the answer; callers must not rely on it under concurrent
    /// modification.
    ///
    /// # Errors
    ///
    /// Returns an error if file contents or metadata cannot be read.
    pub fn state(&self) -> Result<State> {
        if fs::is_symlink(&self.target) {
            return Ok(State::new(StateCode::External));
        }

        if !self.name.exists() {
            return Ok(State::new(StateCode::Missing));
        }

        if !self.target.exists() {
            return Ok(State::with_message(StateCode::Missing, "not in repository"));
        }

        if fs::is_symlink(&self.name) {
            if !fs::same_file(&self.name, &self.target) {
                return Ok(State::with_message(
                    StateCode::Conflict,
                    "source and target are not the same file",
                ));
            }
            return Ok(State::new(StateCode::Link));
        }

        if !self.name.is_file() {
            return Ok(State::with_message(
                StateCode::Conflict,
                "home path is not a regular file",
            ));
        }
        if !self.target.is_file() {
            return Ok(State::with_message(
                StateCode::Conflict,
                "repository path is not a regular file",
            ));
        }

        if !self.same_contents()? {
            return Ok(State::with_message(StateCode::Conflict, self.conflict_hint()?));
        }

        Ok(State::new(StateCode::Copy))
    }

    fn same_contents(&self) -> Result<bool> {
        Ok(fs::content_digest(&self.name)? == fs::content_digest(&self.target)?)
    }

    /// Tell the user which side changed last and how to overwrite the other.
    fn conflict_hint(&self) -> Result<String> {
        let home_is_newer = fs::change_time(&self.name)? > fs::change_time(&self.target)?;
        Ok(if home_is_newer {
            format!(
                "the version in your home directory is newer; run `dotlink add -c {}` to overwrite the repository copy",
                self.name.display()
            )
        } else {
            "the version in the repository is newer; run `dotlink sync -f` to overwrite the home copy"
                .to_string()
        })
    }
}

impl fmt::Display for Dotfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.display())
    }
}
