//! User configuration: repository locations and linking preferences.
//!
//! Read from `$XDG_CONFIG_HOME/dotlink/config.toml` (falling back to
//! `~/.config/dotlink/config.toml`). Every key is optional; command-line
//! flags override whatever the file sets.
pub mod toml_loader;

use anyhow::Result;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::repository::RepositorySettings;

/// Settings loaded from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Repository directories; `~` is expanded against the home directory.
    pub repos: Vec<PathBuf>,
    /// Write symlink text relative to the link's directory.
    pub relative_symlinks: bool,
    /// Map `~/.vimrc` to `<repo>/vimrc` instead of `<repo>/.vimrc`.
    pub remove_leading_dot: bool,
    /// Extra ignore globs, added to the built-in ones.
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: vec![PathBuf::from("~/Dotfiles")],
            relative_symlinks: false,
            remove_leading_dot: false,
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration file at `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        toml_loader::load_config(path)
    }

    /// The per-repository part of the configuration.
    #[must_use]
    pub fn repository_settings(&self) -> RepositorySettings {
        RepositorySettings {
            remove_leading_dot: self.remove_leading_dot,
            ignore: self.ignore.clone(),
        }
    }
}

/// The current user's home directory.
///
/// # Errors
///
/// Returns an error if the HOME (or USERPROFILE on Windows) environment variable
/// is not set.
pub fn home_dir() -> Result<PathBuf> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .map_err(|_| anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set"))?
    } else {
        std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
    };
    Ok(PathBuf::from(home))
}

/// Default location of the configuration file.
#[must_use]
pub fn default_path(home: &Path) -> PathBuf {
    config_path(std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from), home)
}

fn config_path(xdg_config_home: Option<PathBuf>, home: &Path) -> PathBuf {
    xdg_config_home
        .filter(|dir| dir.is_absolute())
        .unwrap_or_else(|| home.join(".config"))
        .join("dotlink")
        .join("config.toml")
}

/// Replace a leading `~` component with `home`.
///
/// Only the bare `~` form is understood; `~user` is left untouched.
#[must_use]
pub fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let rest = components.as_path();
            if rest.as_os_str().is_empty() {
                home.to_path_buf()
            } else {
                home.join(rest)
            }
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_dotfiles() {
        let config = Config::default();
        assert_eq!(config.repos, vec![PathBuf::from("~/Dotfiles")]);
        assert!(!config.relative_symlinks);
        assert!(!config.remove_leading_dot);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "remove_leading_dot = true\nignore = [\"*.swp\"]\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert!(config.remove_leading_dot);
        assert_eq!(config.repos, vec![PathBuf::from("~/Dotfiles")]);
        assert_eq!(
            config.repository_settings(),
            RepositorySettings {
                remove_leading_dot: true,
                ignore: vec!["*.swp".to_string()],
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "repo = \"~/dots\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn expand_tilde_replaces_leading_component() {
        let home = Path::new("/home/u");
        assert_eq!(
            expand_tilde(Path::new("~/Dotfiles"), home),
            PathBuf::from("/home/u/Dotfiles")
        );
        assert_eq!(expand_tilde(Path::new("~"), home), PathBuf::from("/home/u"));
        assert_eq!(
            expand_tilde(Path::new("/srv/dots"), home),
            PathBuf::from("/srv/dots")
        );
        assert_eq!(
            expand_tilde(Path::new("~other/dots"), home),
            PathBuf::from("~other/dots")
        );
    }

    #[test]
    fn config_path_prefers_absolute_xdg_dir() {
        let home = Path::new("/home/u");
        assert_eq!(
            config_path(Some(PathBuf::from("/xdg")), home),
            PathBuf::from("/xdg/dotlink/config.toml")
        );
        assert_eq!(
            config_path(Some(PathBuf::from("relative")), home),
            PathBuf::from("/home/u/.config/dotlink/config.toml")
        );
        assert_eq!(
            config_path(None, home),
            PathBuf::from("/home/u/.config/dotlink/config.toml")
        );
    }
}
