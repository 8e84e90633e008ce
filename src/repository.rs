//! Repositories: directories that hold the tracked copies of dotfiles.
//!
//! A [`Repository`] maps between the home tree and its own tree, decides
//! which files are ignored, and enumerates what it tracks. The dotfiles it
//! hands out know nothing about each other, so cleanup that spans files
//! (pruning empty directories) lives here.
use anyhow::{Context as _, Result, bail};
use glob::Pattern;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::expand_tilde;
use crate::dotfile::Dotfile;
use crate::error::DotfileError;
use crate::logging::Log;
use crate::operations::{Action, Operations};

/// Files never tracked, matched against `*/<pattern>` on the full path.
pub const IGNORE_PATTERNS: &[&str] = &[
    "*/.git/*",
    ".gitignore",
    ".gitmodules",
    ".git",
    ".travis.yml",
    "README*",
    "Readme*",
    "*~",
    "*#",
    ".DS_Store",
    "LICENSE",
];

/// Per-repository options taken from the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySettings {
    /// Strip the leading dot when mapping home paths into the repository.
    pub remove_leading_dot: bool,
    /// Extra ignore globs, in the same form as [`IGNORE_PATTERNS`].
    pub ignore: Vec<String>,
}

/// A directory containing dotfiles.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    home: PathBuf,
    remove_leading_dot: bool,
    ignore: Vec<Pattern>,
}

impl Repository {
    /// Open the repository at `path`, creating its directory when absent.
    ///
    /// `~` in `path` expands to `home`. Both paths are resolved to absolute
    /// canonical form so later comparisons are purely lexical.
    ///
    /// # Errors
    ///
    /// Returns an error if `home` does not exist, the repository directory
    /// cannot be created, or an ignore pattern is not a valid glob.
    pub fn new(
        path: &Path,
        home: &Path,
        settings: &RepositorySettings,
        log: &dyn Log,
    ) -> Result<Self> {
        let home = dunce::canonicalize(home)
            .with_context(|| format!("Directory not found: {}", home.display()))?;

        let path = std::path::absolute(expand_tilde(path, &home))
            .with_context(|| format!("resolve repository path {}", path.display()))?;
        if !path.exists() {
            log.info(&format!("Creating new repository: {}", path.display()));
            std::fs::create_dir_all(&path)
                .with_context(|| format!("create repository {}", path.display()))?;
        }
        let path = dunce::canonicalize(&path)
            .with_context(|| format!("resolve repository path {}", path.display()))?;

        let ignore = IGNORE_PATTERNS
            .iter()
            .copied()
            .chain(settings.ignore.iter().map(String::as_str))
            .map(|pattern| {
                Pattern::new(&format!("*/{pattern}"))
                    .with_context(|| format!("invalid ignore pattern '{pattern}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path,
            home,
            remove_leading_dot: settings.remove_leading_dot,
            ignore,
        })
    }

    /// The repository directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The home directory dotfiles are linked into.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Does `path` match an ignore pattern?
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.iter().any(|pattern| pattern.matches_path(path))
    }

    /// The home path that the repository file `target` belongs at.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not inside the repository.
    pub fn dotfile_path(&self, target: &Path) -> Result<PathBuf> {
        let Ok(relative) = target.strip_prefix(&self.path) else {
            bail!(
                "'{}' is not inside repository {}",
                target.display(),
                self.path.display()
            );
        };
        if self.remove_leading_dot {
            let mut dotted = OsString::from(".");
            dotted.push(relative.as_os_str());
            Ok(self.home.join(dotted))
        } else {
            Ok(self.home.join(relative))
        }
    }

    /// The repository path that stores the home file `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DotfileError::NotRootedInHome`] if `path` is not below home.
    pub fn dotfile_target(&self, path: &Path) -> Result<PathBuf, DotfileError> {
        let Ok(relative) = path.strip_prefix(&self.home) else {
            return Err(DotfileError::NotRootedInHome(path.to_path_buf()));
        };
        if self.remove_leading_dot
            && let Some(name) = relative.to_str()
            && let Some(undotted) = name.strip_prefix('.')
        {
            return Ok(self.path.join(undotted));
        }
        Ok(self.path.join(relative))
    }

    /// Build the dotfile for the home path `path`, validating it first.
    ///
    /// # Errors
    ///
    /// - [`DotfileError::NotRootedInHome`] if `path` is home itself or outside it.
    /// - [`DotfileError::InRepository`] if `path` lies inside the repository.
    /// - [`DotfileError::TargetIgnored`] if the repository path is ignored.
    /// - [`DotfileError::IsDirectory`] if `path` is a directory.
    pub fn dotfile(&self, path: &Path) -> Result<Dotfile, DotfileError> {
        let target = self.dotfile_target(path)?;

        if path == self.home {
            return Err(DotfileError::NotRootedInHome(path.to_path_buf()));
        }
        if path.starts_with(&self.path) {
            return Err(DotfileError::InRepository(path.to_path_buf()));
        }
        if self.is_ignored(&target) {
            return Err(DotfileError::TargetIgnored(path.to_path_buf()));
        }
        if path.is_dir() {
            return Err(DotfileError::IsDirectory(path.to_path_buf()));
        }

        Ok(Dotfile::new(path, target))
    }

    /// Every tracked dotfile, sorted by home path.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be walked.
    pub fn contents(&self) -> Result<Vec<Dotfile>> {
        let mut dotfiles = self
            .files_below(&self.path)?
            .into_iter()
            .map(|target| Ok(Dotfile::new(self.dotfile_path(&target)?, target)))
            .collect::<Result<Vec<_>>>()?;
        dotfiles.sort();
        Ok(dotfiles)
    }

    /// Dotfiles for user-supplied home paths.
    ///
    /// Paths are made absolute (with `~` expanded) and directories are
    /// expanded to the non-ignored files below them. Each resulting path
    /// yields either a dotfile or the reason it was rejected, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a path cannot be made absolute or a directory
    /// cannot be walked.
    pub fn dotfiles(&self, paths: &[PathBuf]) -> Result<Vec<Result<Dotfile, DotfileError>>> {
        let mut expanded = Vec::with_capacity(paths.len());
        for path in paths {
            let path = std::path::absolute(expand_tilde(path, &self.home))
                .with_context(|| format!("resolve {}", path.display()))?;
            if path.is_dir() && path != self.home {
                expanded.extend(self.files_below(&path)?);
            } else {
                expanded.push(path);
            }
        }
        Ok(expanded.iter().map(|path| self.dotfile(path)).collect())
    }

    /// Remove empty directories inside the repository, deepest first.
    ///
    /// The repository root and ignored directories are left alone. A
    /// directory whose only entries were pruned earlier in the same pass
    /// counts as empty, so a dry run reports what a real run removes.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked or a directory cannot
    /// be removed.
    pub fn prune(&self, ops: &Operations<'_>) -> Result<()> {
        let mut dirs = Vec::new();
        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e.path()))
        {
            let entry = entry
                .with_context(|| format!("Failed to walk repository {}", self.path.display()))?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }

        let mut pruned: Vec<PathBuf> = Vec::new();
        for dir in dirs.into_iter().rev() {
            let mut entries = std::fs::read_dir(&dir)
                .with_context(|| format!("read directory {}", dir.display()))?;
            let empty = entries.all(|entry| {
                entry.is_ok_and(|entry| pruned.iter().any(|p| *p == entry.path()))
            });
            if empty {
                ops.run(Action::Prune(&dir))?;
                pruned.push(dir);
            }
        }
        Ok(())
    }

    /// Non-directory, non-ignored entries below `dir`, in walk order.
    ///
    /// Symlinks are listed, not followed, unless they point at a directory.
    fn files_below(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e.path()))
        {
            let entry =
                entry.with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
            if !entry.path().is_dir() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// The repositories selected for this invocation, in command-line order.
#[derive(Debug)]
pub struct Repositories {
    repos: Vec<Repository>,
}

impl Repositories {
    /// Open every repository in `paths`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Repository::new`].
    pub fn new(
        paths: &[PathBuf],
        home: &Path,
        settings: &RepositorySettings,
        log: &dyn Log,
    ) -> Result<Self> {
        let repos = paths
            .iter()
            .map(|path| Repository::new(path, home, settings, log))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { repos })
    }

    /// Number of repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Whether no repository was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Iterate in command-line order.
    pub fn iter(&self) -> std::slice::Iter<'_, Repository> {
        self.repos.iter()
    }

    /// The only repository, for commands that modify exactly one.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one repository was given.
    pub fn single(&self) -> Result<&Repository> {
        match self.repos.as_slice() {
            [repo] => Ok(repo),
            [] => bail!("No repository specified (use -r/--repo)"),
            _ => bail!("Must specify exactly one repository (-r/--repo)"),
        }
    }
}

impl<'a> IntoIterator for &'a Repositories {
    type Item = &'a Repository;
    type IntoIter = std::slice::Iter<'a, Repository>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{CapturedLog, LogEntry};

    struct Fixture {
        _dir: tempfile::TempDir,
        home: PathBuf,
        log: CapturedLog,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let home = dunce::canonicalize(dir.path()).unwrap().join("home");
        std::fs::create_dir_all(&home).unwrap();
        Fixture {
            _dir: dir,
            home,
            log: CapturedLog::new(),
        }
    }

    impl Fixture {
        fn repo(&self, settings: &RepositorySettings) -> Repository {
            Repository::new(Path::new("~/Dotfiles"), &self.home, settings, &self.log).unwrap()
        }

        fn touch(&self, path: &Path) {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "x").unwrap();
        }
    }

    #[test]
    fn new_creates_missing_repository() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        assert_eq!(repo.path(), f.home.join("Dotfiles"));
        assert!(repo.path().is_dir());
        assert!(matches!(
            &f.log.entries()[0],
            LogEntry::Info(msg) if msg.starts_with("Creating new repository")
        ));
    }

    #[test]
    fn new_fails_without_home() {
        let f = fixture();
        let err = Repository::new(
            Path::new("/tmp/whatever"),
            &f.home.join("nope"),
            &RepositorySettings::default(),
            &f.log,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Directory not found"), "got: {err}");
    }

    #[test]
    fn new_rejects_invalid_ignore_glob() {
        let f = fixture();
        let settings = RepositorySettings {
            remove_leading_dot: false,
            ignore: vec!["[".to_string()],
        };
        assert!(Repository::new(Path::new("~/Dotfiles"), &f.home, &settings, &f.log).is_err());
    }

    #[test]
    fn maps_paths_both_ways() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        let home_path = f.home.join(".config/git/config");
        let target = repo.dotfile_target(&home_path).unwrap();
        assert_eq!(target, repo.path().join(".config/git/config"));
        assert_eq!(repo.dotfile_path(&target).unwrap(), home_path);
    }

    #[test]
    fn maps_paths_without_leading_dot() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings {
            remove_leading_dot: true,
            ignore: Vec::new(),
        });
        let target = repo.dotfile_target(&f.home.join(".vimrc")).unwrap();
        assert_eq!(target, repo.path().join("vimrc"));
        assert_eq!(repo.dotfile_path(&target).unwrap(), f.home.join(".vimrc"));
    }

    #[test]
    fn dotfile_outside_home_is_rejected() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        assert_eq!(
            repo.dotfile(Path::new("/etc/hosts")),
            Err(DotfileError::NotRootedInHome(PathBuf::from("/etc/hosts")))
        );
    }

    #[test]
    fn dotfile_inside_repository_is_rejected() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        let inside = repo.path().join(".vimrc");
        assert!(matches!(
            repo.dotfile(&inside),
            Err(DotfileError::InRepository(_))
        ));
    }

    #[test]
    fn dotfile_with_ignored_target_is_rejected() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        assert!(matches!(
            repo.dotfile(&f.home.join("README.md")),
            Err(DotfileError::TargetIgnored(_))
        ));
        assert!(matches!(
            repo.dotfile(&f.home.join(".vimrc~")),
            Err(DotfileError::TargetIgnored(_))
        ));
    }

    #[test]
    fn dotfile_directory_is_rejected() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        std::fs::create_dir(f.home.join(".vim")).unwrap();
        assert!(matches!(
            repo.dotfile(&f.home.join(".vim")),
            Err(DotfileError::IsDirectory(_))
        ));
    }

    #[test]
    fn contents_skips_ignored_and_sorts() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings {
            remove_leading_dot: false,
            ignore: vec!["*.swp".to_string()],
        });
        for name in [".zshrc", ".bashrc", ".config/nvim/init.lua", "README.md", ".git/HEAD", ".zshrc.swp"] {
            f.touch(&repo.path().join(name));
        }

        let names: Vec<PathBuf> = repo
            .contents()
            .unwrap()
            .into_iter()
            .map(|d| d.short_name(&f.home).to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from(".bashrc"),
                PathBuf::from(".config/nvim/init.lua"),
                PathBuf::from(".zshrc"),
            ]
        );
    }

    #[test]
    fn dotfiles_expands_directories() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        f.touch(&f.home.join(".config/git/config"));
        f.touch(&f.home.join(".config/git/ignore"));
        f.touch(&f.home.join(".vimrc"));

        let results = repo
            .dotfiles(&[PathBuf::from("~/.config"), f.home.join(".vimrc")])
            .unwrap();

        let names: Vec<PathBuf> = results
            .into_iter()
            .map(|r| r.unwrap().name)
            .collect();
        assert_eq!(
            names,
            vec![
                f.home.join(".config/git/config"),
                f.home.join(".config/git/ignore"),
                f.home.join(".vimrc"),
            ]
        );
    }

    #[test]
    fn dotfiles_reports_rejects_in_place() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        let results = repo
            .dotfiles(&[PathBuf::from("/etc/hosts"), f.home.join(".vimrc")])
            .unwrap();
        assert!(matches!(results[0], Err(DotfileError::NotRootedInHome(_))));
        assert!(results[1].is_ok());
    }

    #[test]
    fn prune_removes_nested_empty_directories() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        std::fs::create_dir_all(repo.path().join("config/nvim/lua")).unwrap();
        f.touch(&repo.path().join("config/git/config"));
        std::fs::create_dir_all(repo.path().join(".git/refs")).unwrap();

        let ops = Operations::new(&f.home, &f.log);
        repo.prune(&ops).unwrap();

        assert!(!repo.path().join("config/nvim").exists());
        assert!(repo.path().join("config/git/config").exists());
        assert!(repo.path().join(".git/refs").exists());
        assert!(repo.path().is_dir());
    }

    #[test]
    fn prune_dry_run_reports_parents_of_pruned_dirs() {
        let f = fixture();
        let repo = f.repo(&RepositorySettings::default());
        std::fs::create_dir_all(repo.path().join("a/b")).unwrap();

        let plan = CapturedLog::new();
        let ops = Operations::new(&f.home, &plan).with_dry_run(true);
        repo.prune(&ops).unwrap();

        assert!(repo.path().join("a/b").exists());
        assert_eq!(
            plan.dry_run_actions(),
            vec![
                format!("PRUNE  {}", repo.path().join("a/b").display()),
                format!("PRUNE  {}", repo.path().join("a").display()),
            ]
        );
    }

    #[test]
    fn single_requires_exactly_one() {
        let f = fixture();
        let settings = RepositorySettings::default();
        let one = Repositories::new(&[PathBuf::from("~/Dotfiles")], &f.home, &settings, &f.log)
            .unwrap();
        assert!(one.single().is_ok());

        let two = Repositories::new(
            &[PathBuf::from("~/Dotfiles"), PathBuf::from("~/Work")],
            &f.home,
            &settings,
            &f.log,
        )
        .unwrap();
        assert_eq!(two.len(), 2);
        assert!(two.single().is_err());
    }
}
