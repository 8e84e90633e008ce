//! Core logging types: per-file entries, status, and the [`Log`] trait.

/// Outcome of one dotfile within a batch, kept for the run summary.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Display name of the dotfile (usually relative to `$HOME`).
    pub name: String,
    /// Final status of the operation on this file.
    pub status: FileStatus,
    /// Optional detail message (e.g. the failure reason).
    pub message: Option<String>,
}

/// Status of a dotfile after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// The operation completed.
    Ok,
    /// The file was deliberately left alone (e.g. an unforced conflict).
    Skipped,
    /// The operation was only reported; nothing was changed.
    DryRun,
    /// The operation was refused or failed for this file.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) forwards to `tracing`;
/// [`CapturedLog`](super::captured::CapturedLog) keeps entries in memory.
/// Dotfile operations only ever see this trait.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that a dry run would have performed.
    fn dry_run(&self, msg: &str);
    /// Record a per-file result for the summary.
    fn record(&self, name: &str, status: FileStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn file_status_equality() {
        assert_eq!(FileStatus::Ok, FileStatus::Ok);
        assert_ne!(FileStatus::Ok, FileStatus::Failed);
        assert_ne!(FileStatus::Skipped, FileStatus::DryRun);
    }

    #[test]
    fn file_entry_clone() {
        let entry = FileEntry {
            name: ".vimrc".to_string(),
            status: FileStatus::Failed,
            message: Some("'.vimrc' target already exists".to_string()),
        };
        let cloned = entry.clone();
        assert_eq!(cloned.name, entry.name);
        assert_eq!(cloned.status, entry.status);
        assert_eq!(cloned.message, entry.message);
    }
}
