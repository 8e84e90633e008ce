// Shared helpers for integration tests.
//
// Provides a temporary home directory with an empty repository inside it,
// plus helpers for writing files and describing the resulting tree.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotlink::cli::GlobalOpts;
use dotlink::dotfile::Dotfile;

/// An isolated home directory backed by a [`tempfile::TempDir`].
///
/// The repository lives at `<home>/Dotfiles` and the configuration file at
/// `<home>/dotlink.toml`; neither exists until a test creates it.
pub struct TestHome {
    _root: tempfile::TempDir,
    /// Canonical home directory.
    pub home: PathBuf,
}

impl TestHome {
    /// Create an empty home directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let home = dunce::canonicalize(root.path()).expect("canonicalize temp dir");
        Self { _root: root, home }
    }

    /// Path of the repository directory.
    pub fn repo(&self) -> PathBuf {
        self.home.join("Dotfiles")
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("dotlink.toml")
    }

    /// Global options pointing every command at this home and repository.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            repos: vec![self.repo()],
            home: Some(self.home.clone()),
            config: Some(self.config_path()),
            relative: false,
        }
    }

    /// Write the configuration file.
    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.config_path(), toml).expect("write config");
    }

    /// Write `content` to `rel` below home, creating parent directories.
    pub fn write_home(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.home.join(rel), content)
    }

    /// Write `content` to `rel` below the repository, creating parent directories.
    pub fn write_repo(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.repo().join(rel), content)
    }

    /// The dotfile pairing `~/<name>` with `<repo>/<target>`.
    pub fn dotfile(&self, name: &str, target: &str) -> Dotfile {
        Dotfile::new(self.home.join(name), self.repo().join(target))
    }

    /// A sorted listing of everything below home, one entry per line.
    ///
    /// Directories end in `/`, symlinks show their text, regular files
    /// show their contents.
    pub fn tree(&self) -> String {
        tree(&self.home)
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent dirs");
    std::fs::write(path, content).expect("write file");
    path.to_path_buf()
}

/// See [`TestHome::tree`].
pub fn tree(root: &Path) -> String {
    let mut lines = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.expect("walk");
        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("below root")
            .display()
            .to_string();
        let ft = entry.file_type();
        if ft.is_symlink() {
            let text = std::fs::read_link(entry.path()).expect("read link");
            let text = text
                .strip_prefix(root)
                .map_or_else(|_| text.display().to_string(), |t| format!("~/{}", t.display()));
            lines.push(format!("{rel} -> {text}"));
        } else if ft.is_dir() {
            lines.push(format!("{rel}/"));
        } else {
            let content = std::fs::read_to_string(entry.path()).expect("read file");
            lines.push(format!("{rel} = {content:?}"));
        }
    }
    lines.join("\n")
}
