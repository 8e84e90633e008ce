//! Console logger with dry-run awareness and per-file summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{FileEntry, FileStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger used by the `dotlink` binary.
///
/// Messages go through `tracing`, so the console formatter and the
/// persistent log file installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) both see them.
/// Per-file results are collected for [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    files: Mutex<Vec<FileEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            files: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<FileEntry> {
        self.files.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only with `--verbose`; always in the file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action that a dry run would have performed.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a per-file result for the summary.
    pub fn record(&self, name: &str, status: FileStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.files.lock() {
            guard.push(FileEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Number of files recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries()
            .iter()
            .filter(|f| f.status == FileStatus::Failed)
            .count()
    }

    /// Print the summary of all recorded files.
    ///
    /// Prints nothing when no file was processed.
    pub fn print_summary(&self) {
        let files = self.entries();
        if files.is_empty() {
            return;
        }

        self.stage("Summary");
        for file in files.iter().filter(|f| f.status == FileStatus::Failed) {
            match &file.message {
                Some(msg) => self.info(&format!("\x1b[31m✗ {} ({msg})\x1b[0m", file.name)),
                None => self.info(&format!("\x1b[31m✗ {}\x1b[0m", file.name)),
            }
        }

        let count = |status: FileStatus| files.iter().filter(|f| f.status == status).count();
        self.info(&format!(
            "{} files: \x1b[32m{} ok\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            files.len(),
            count(FileStatus::Ok),
            count(FileStatus::Skipped),
            count(FileStatus::DryRun),
            count(FileStatus::Failed),
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, status: FileStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}
