//! Read-only filesystem queries shared by state inspection and operations.
//!
//! Every helper here inspects; none of them mutate. Mutations go through
//! [`Operations`](crate::operations::Operations) so that dry runs can
//! suppress them.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Is there any directory entry at `path`, including a dangling symlink?
#[must_use]
pub fn lexists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Is `path` itself a symlink (without following it)?
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Resolve every symlink in `path` to the real file it designates.
///
/// Returns `None` when the chain ends in nothing (dangling link or missing
/// file).
#[must_use]
pub fn resolve(path: &Path) -> Option<PathBuf> {
    dunce::canonicalize(path).ok()
}

/// Do `a` and `b` designate the same file after following symlinks?
///
/// `false` when either side does not resolve.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt as _;
        match (std::fs::metadata(a), std::fs::metadata(b)) {
            (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        match (resolve(a), resolve(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }
}

/// SHA-256 digest of the full contents of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn content_digest(path: &Path) -> Result<[u8; 32]> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).with_context(|| format!("read {}", path.display()))?;
    Ok(hasher.finalize().into())
}

/// Last status-change time of `path` (following symlinks).
///
/// Uses `ctime` on Unix and falls back to the modification time elsewhere.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read.
pub fn change_time(path: &Path) -> Result<SystemTime> {
    let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt as _;
        let secs = u64::try_from(meta.ctime()).unwrap_or(0);
        let nanos = u32::try_from(meta.ctime_nsec()).unwrap_or(0);
        Ok(SystemTime::UNIX_EPOCH + std::time::Duration::new(secs, nanos))
    }
    #[cfg(not(unix))]
    {
        meta.modified()
            .with_context(|| format!("modification time of {}", path.display()))
    }
}

/// Express `target` relative to the directory `base`, lexically.
///
/// Both paths are expected to be absolute; no symlinks are resolved, so the
/// result is what a relative symlink placed in `base` must contain.
#[must_use]
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in target.iter().skip(common) {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_sibling_directories() {
        assert_eq!(
            relative_path(Path::new("/home/u/Dotfiles/vimrc"), Path::new("/home/u")),
            PathBuf::from("Dotfiles/vimrc")
        );
        assert_eq!(
            relative_path(
                Path::new("/home/u/Dotfiles/config/git/config"),
                Path::new("/home/u/.config/git")
            ),
            PathBuf::from("../../Dotfiles/config/git/config")
        );
    }

    #[test]
    fn relative_path_same_directory() {
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn digest_matches_for_equal_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, "set nocompatible\n").unwrap();
        std::fs::write(&b, "set nocompatible\n").unwrap();
        std::fs::write(&c, "set compatible\n").unwrap();
        assert_eq!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
        assert_ne!(content_digest(&a).unwrap(), content_digest(&c).unwrap());
    }

    #[test]
    fn digest_of_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(content_digest(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn lexists_false_for_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!lexists(&dir.path().join("missing")));
        assert!(lexists(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_lexists_but_does_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();
        assert!(lexists(&link));
        assert!(is_symlink(&link));
        assert!(!link.exists());
        assert!(resolve(&link).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn same_file_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        let other = dir.path().join("other");
        let link = dir.path().join("link");
        std::fs::write(&real, "x").unwrap();
        std::fs::write(&other, "x").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(same_file(&link, &real));
        assert!(!same_file(&link, &other));
        assert!(!same_file(&link, &dir.path().join("missing")));
    }

    #[test]
    fn change_time_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        assert!(change_time(&file).unwrap() > SystemTime::UNIX_EPOCH);
    }
}
