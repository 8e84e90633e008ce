//! Log file location, timestamps, and ANSI stripping for the file layer.
use std::path::PathBuf;

/// Timestamp format of the run header in a log file.
pub(super) const HEADER_STAMP: &str = "%Y-%m-%d %H:%M:%S";
/// Timestamp format of each event line in a log file.
pub(super) const LINE_STAMP: &str = "%H:%M:%S";

/// Remove ANSI escape sequences.
///
/// A CSI sequence (`ESC [`) runs through its final byte in `@`..=`~`; any
/// other escape consumes exactly one following character.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut pieces = s.split('\x1b');
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let rest = piece.strip_prefix('[').map_or_else(
            || {
                piece
                    .char_indices()
                    .nth(1)
                    .and_then(|(i, _)| piece.get(i..))
                    .unwrap_or_default()
            },
            |csi| {
                csi.find(|c: char| ('@'..='~').contains(&c))
                    .and_then(|end| csi.get(end + 1..))
                    .unwrap_or_default()
            },
        );
        out.push_str(rest);
    }
    out
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn timestamp(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

/// Log file for `command`: `$XDG_CACHE_HOME/dotlink/<command>.log`, falling
/// back to `~/.cache`. Creates the directory; `None` if that fails.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let cache = match std::env::var_os("XDG_CACHE_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => crate::config::home_dir().ok()?.join(".cache"),
    };
    let dir = cache.join("dotlink");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_sgr() {
        assert_eq!(strip_ansi("\x1b[31m✗ .vimrc\x1b[0m"), "✗ .vimrc");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mSummary\x1b[0m"),
            "==> Summary"
        );
        assert_eq!(strip_ansi("plain"), "plain");
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn strip_ansi_removes_other_escapes() {
        assert_eq!(strip_ansi("\x1b[2Jhello"), "hello");
        assert_eq!(strip_ansi("\x1bMtext"), "text");
        assert_eq!(strip_ansi("cut\x1b["), "cut");
    }

    #[test]
    fn timestamps_follow_format() {
        let line = timestamp(LINE_STAMP);
        assert_eq!(line.len(), 8);
        assert_eq!(&line[2..3], ":");
        let header = timestamp(HEADER_STAMP);
        assert_eq!(header.len(), 19);
        assert_eq!(&header[10..11], " ");
    }
}
