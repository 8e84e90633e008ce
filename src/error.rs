//! Typed failures for dotfile operations.
//!
//! [`DotfileError`] is the recoverable taxonomy: each variant names the path
//! that was refused and why. Operations return it inside [`anyhow::Error`],
//! and batch callers recover it with
//! [`downcast_ref`](anyhow::Error::downcast_ref) so that one refused file
//! does not stop the rest of the batch. Anything else (permission denied, a
//! full disk, a broken caller contract) stays a plain `anyhow::Error` and is
//! allowed to abort the batch.
//!
//! ```
//! use dotlink::error::DotfileError;
//!
//! let err = anyhow::Error::from(DotfileError::TargetExists("/home/me/.vimrc".into()));
//! assert!(matches!(
//!     err.downcast_ref::<DotfileError>(),
//!     Some(DotfileError::TargetExists(_))
//! ));
//! assert_eq!(err.to_string(), "'/home/me/.vimrc' target already exists");
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A per-file refusal raised by a dotfile operation or repository lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DotfileError {
    /// A symlink was expected at the path, but something else (or nothing) is there.
    #[error("'{}' is not a symlink", .0.display())]
    NotASymlink(PathBuf),

    /// The path is already occupied where a new file or link must go.
    #[error("'{}' already exists", .0.display())]
    Exists(PathBuf),

    /// Nothing at all exists at the path.
    #[error("'{}' not found", .0.display())]
    NotFound(PathBuf),

    /// A symlink is present but resolves to nothing.
    #[error("'{}' is a dangling symlink", .0.display())]
    Dangling(PathBuf),

    /// The repository path is already occupied.
    #[error("'{}' target already exists", .0.display())]
    TargetExists(PathBuf),

    /// The repository path should exist but does not.
    #[error("'{}' target is missing", .0.display())]
    TargetMissing(PathBuf),

    /// The file is already tracked by (or lives inside) the repository.
    #[error("'{}' is already within the repository", .0.display())]
    InRepository(PathBuf),

    /// A regular file was required but the path is a symlink.
    #[error("'{}' is a symlink", .0.display())]
    IsSymlink(PathBuf),

    /// Source and destination of a copy are the same file.
    #[error("'{}' is the same file as its target", .0.display())]
    SameFile(PathBuf),

    /// The path is a directory; only files are tracked.
    #[error("'{}' is a directory", .0.display())]
    IsDirectory(PathBuf),

    /// The path is outside the home directory.
    #[error("'{}' not rooted in home directory", .0.display())]
    NotRootedInHome(PathBuf),

    /// The repository path matches an ignore pattern.
    #[error("'{}' targets an ignored file", .0.display())]
    TargetIgnored(PathBuf),
}

impl DotfileError {
    /// The path the failure refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotASymlink(p)
            | Self::Exists(p)
            | Self::NotFound(p)
            | Self::Dangling(p)
            | Self::TargetExists(p)
            | Self::TargetMissing(p)
            | Self::InRepository(p)
            | Self::IsSymlink(p)
            | Self::SameFile(p)
            | Self::IsDirectory(p)
            | Self::NotRootedInHome(p)
            | Self::TargetIgnored(p) => p,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn not_a_symlink_display() {
        let e = DotfileError::NotASymlink(PathBuf::from("/home/u/.bashrc"));
        assert_eq!(e.to_string(), "'/home/u/.bashrc' is not a symlink");
    }

    #[test]
    fn target_missing_display() {
        let e = DotfileError::TargetMissing(PathBuf::from("/home/u/.vimrc"));
        assert_eq!(e.to_string(), "'/home/u/.vimrc' target is missing");
    }

    #[test]
    fn in_repository_display() {
        let e = DotfileError::InRepository(PathBuf::from(".zshrc"));
        assert_eq!(e.to_string(), "'.zshrc' is already within the repository");
    }

    #[test]
    fn dangling_display() {
        let e = DotfileError::Dangling(PathBuf::from("/home/u/.old"));
        assert!(e.to_string().contains("dangling symlink"));
    }

    #[test]
    fn path_returns_inner_path() {
        let e = DotfileError::TargetIgnored(PathBuf::from("/home/u/README.md"));
        assert_eq!(e.path(), Path::new("/home/u/README.md"));
    }

    #[test]
    fn recovered_from_anyhow() {
        let err: anyhow::Error = DotfileError::Exists(PathBuf::from("/x")).into();
        let err = err.context("enable");
        assert_eq!(
            err.downcast_ref::<DotfileError>(),
            Some(&DotfileError::Exists(PathBuf::from("/x")))
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn dotfile_error_is_send_sync() {
        assert_send_sync::<DotfileError>();
    }
}
