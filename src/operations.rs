//! Filesystem mutations with dry-run suppression.
//!
//! Every change a dotfile operation makes is described as an [`Action`] and
//! handed to [`Operations::run`]. In a dry run the action is only reported
//! through [`Log::dry_run`]; otherwise it is logged at debug level and then
//! performed. Because nothing else in the crate touches the filesystem for
//! writing, a dry run never performs a partial mutation.

use anyhow::{Context as _, Result};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::logging::Log;

/// A single filesystem mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Create a directory and any missing ancestors.
    Mkdir(&'a Path),
    /// Atomically rename a file.
    Move {
        /// Current location.
        from: &'a Path,
        /// New location.
        to: &'a Path,
    },
    /// Copy file contents, following symlinks on the source side.
    Copy {
        /// File whose bytes are read.
        from: &'a Path,
        /// File that is created or truncated.
        to: &'a Path,
    },
    /// Create a symlink at `link` whose text is `points_to`.
    Link {
        /// Where the symlink is created.
        link: &'a Path,
        /// The link text (absolute or relative to `link`'s directory).
        points_to: &'a Path,
    },
    /// Remove a file or symlink.
    Unlink(&'a Path),
    /// Remove an empty directory.
    Prune(&'a Path),
}

impl fmt::Display for Action<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mkdir(dir) => write!(f, "MKDIR  {}", dir.display()),
            Self::Move { from, to } => write!(f, "MOVE   {} -> {}", from.display(), to.display()),
            Self::Copy { from, to } => write!(f, "COPY   {} -> {}", from.display(), to.display()),
            Self::Link { link, points_to } => {
                write!(f, "LINK   {} -> {}", link.display(), points_to.display())
            }
            Self::Unlink(path) => write!(f, "UNLINK {}", path.display()),
            Self::Prune(dir) => write!(f, "PRUNE  {}", dir.display()),
        }
    }
}

/// Executes (or, in a dry run, only reports) filesystem actions.
///
/// Carries everything an operation needs besides the dotfile itself: the
/// dry-run flag, whether symlinks are written relative to their directory,
/// the home directory that bounds directory pruning, and the logger.
pub struct Operations<'a> {
    dry_run: bool,
    relative_symlinks: bool,
    home: PathBuf,
    log: &'a dyn Log,
    /// Directories a dry run has reported as created.
    planned_dirs: RefCell<Vec<PathBuf>>,
}

impl fmt::Debug for Operations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operations")
            .field("dry_run", &self.dry_run)
            .field("relative_symlinks", &self.relative_symlinks)
            .field("home", &self.home)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl<'a> Operations<'a> {
    /// Operations that really mutate the filesystem, with absolute symlinks.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>, log: &'a dyn Log) -> Self {
        Self {
            dry_run: false,
            relative_symlinks: false,
            home: home.into(),
            log,
            planned_dirs: RefCell::new(Vec::new()),
        }
    }

    /// Only report actions instead of performing them.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Write symlink text relative to the link's parent directory.
    #[must_use]
    pub const fn with_relative_symlinks(mut self, relative: bool) -> Self {
        self.relative_symlinks = relative;
        self
    }

    /// Whether actions are only reported.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether new symlinks are relative.
    #[must_use]
    pub const fn relative_symlinks(&self) -> bool {
        self.relative_symlinks
    }

    /// The home directory; pruning never removes it or anything above it.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The logger actions are reported to.
    #[must_use]
    pub fn log(&self) -> &'a dyn Log {
        self.log
    }

    /// Perform `action`, or only report it in a dry run.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, with the action as context.
    pub fn run(&self, action: Action<'_>) -> Result<()> {
        if self.dry_run {
            self.log.dry_run(&action.to_string());
            return Ok(());
        }
        self.log.debug(&action.to_string());
        perform(action).with_context(|| action.to_string())
    }

    /// Create `dir` (and its ancestors) unless it is already a directory.
    ///
    /// A dry run reports each directory once, as if the first report had
    /// created it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() || self.planned_dirs.borrow().iter().any(|p| p == dir) {
            return Ok(());
        }
        self.run(Action::Mkdir(dir))?;
        if self.dry_run {
            self.planned_dirs.borrow_mut().push(dir.to_path_buf());
        }
        Ok(())
    }

    /// Remove the ancestors of `removed` that are empty once `removed` is gone.
    ///
    /// Walks upward from `removed`'s parent and stops at the first directory
    /// that still has other entries, at the home directory, or at anything
    /// outside it. `removed` is treated as already absent so that a dry run
    /// reports the same directories a real run would remove.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read or removed.
    pub fn prune_empty_ancestors(&self, removed: &Path) -> Result<()> {
        let mut gone = removed.to_path_buf();
        while let Some(dir) = gone.parent().map(Path::to_path_buf) {
            if dir == self.home || !dir.starts_with(&self.home) || !dir.is_dir() {
                break;
            }
            let has_other_entries = std::fs::read_dir(&dir)
                .with_context(|| format!("read directory {}", dir.display()))?
                .filter_map(Result::ok)
                .any(|entry| entry.path() != gone);
            if has_other_entries {
                break;
            }
            self.run(Action::Prune(&dir))?;
            gone = dir;
        }
        Ok(())
    }
}

/// Perform one action against the real filesystem.
fn perform(action: Action<'_>) -> std::io::Result<()> {
    match action {
        Action::Mkdir(dir) => std::fs::create_dir_all(dir),
        Action::Move { from, to } => std::fs::rename(from, to),
        Action::Copy { from, to } => std::fs::copy(from, to).map(|_| ()),
        Action::Link { link, points_to } => create_symlink(points_to, link),
        Action::Unlink(path) => std::fs::remove_file(path),
        Action::Prune(dir) => std::fs::remove_dir(dir),
    }
}

/// Create a symlink at `link` pointing to `target`.
#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Create a file symlink at `link` pointing to `target`.
///
/// Requires Developer Mode or an elevated process on Windows.
#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
