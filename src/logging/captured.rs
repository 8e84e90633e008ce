//! In-memory logger for library callers that want to inspect what an
//! operation reported, most often the plan produced by a dry run.
use std::sync::Mutex;

use super::types::{FileEntry, FileStatus, Log};

/// A single captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header.
    Stage(String),
    /// An informational message.
    Info(String),
    /// A debug message.
    Debug(String),
    /// A warning.
    Warn(String),
    /// An error.
    Error(String),
    /// An action a dry run would have performed.
    DryRun(String),
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that keeps every message and file record in memory.
///
/// Nothing is printed; use [`entries`](Self::entries),
/// [`dry_run_actions`](Self::dry_run_actions) and [`files`](Self::files) to
/// read the captured output back.
#[derive(Debug, Default)]
pub struct CapturedLog {
    entries: Mutex<Vec<LogEntry>>,
    files: Mutex<Vec<FileEntry>>,
}

impl CapturedLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Only the dry-run actions, in emission order.
    #[must_use]
    pub fn dry_run_actions(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::DryRun(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// All recorded per-file results.
    #[must_use]
    pub fn files(&self) -> Vec<FileEntry> {
        self.files.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Log for CapturedLog {
    capture_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
        dry_run => DryRun,
    );

    fn record(&self, name: &str, status: FileStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.files.lock() {
            guard.push(FileEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_in_order() {
        let log = CapturedLog::new();
        log.stage("Adding");
        log.dry_run("MKDIR  /repo/config");
        log.info("added .vimrc");
        assert_eq!(
            log.entries(),
            vec![
                LogEntry::Stage("Adding".to_string()),
                LogEntry::DryRun("MKDIR  /repo/config".to_string()),
                LogEntry::Info("added .vimrc".to_string()),
            ]
        );
    }

    #[test]
    fn dry_run_actions_filters_other_levels() {
        let log = CapturedLog::new();
        log.debug("MOVE  a -> b");
        log.dry_run("LINK  a -> b");
        log.warn("careful");
        assert_eq!(log.dry_run_actions(), vec!["LINK  a -> b".to_string()]);
    }

    #[test]
    fn record_is_kept_separately() {
        let log = CapturedLog::new();
        log.record(".zshrc", FileStatus::Skipped, Some("conflict"));
        assert!(log.entries().is_empty());
        let files = log.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Skipped);
    }
}
