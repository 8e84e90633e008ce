//! Command: show the state of every repository dotfile.
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::io::IsTerminal as _;

use super::CommandSetup;
use crate::cli::{GlobalOpts, StatusOpts};
use crate::dotfile::{State, StateCode};
use crate::logging::Log;

/// One row of status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Home path relative to the home directory.
    pub name: String,
    /// Current state and explanation.
    #[serde(flatten)]
    pub state: State,
}

/// Short label and ANSI color for a state.
const fn label(code: StateCode) -> (&'static str, &'static str) {
    match code {
        StateCode::Missing => ("Miss", "\x1b[33m"),
        StateCode::Conflict => ("Confl", "\x1b[31m"),
        StateCode::Link => ("Link", "\x1b[32m"),
        StateCode::Copy => ("Copy", "\x1b[34m"),
        StateCode::External => ("Extern", "\x1b[36m"),
    }
}

/// Whether a state is shown without `--all`.
const fn needs_attention(code: StateCode) -> bool {
    matches!(code, StateCode::Missing | StateCode::Conflict)
}

/// Render status rows as text, one dotfile per line.
///
/// Conflict explanations follow on an indented line.
#[must_use]
pub fn render(entries: &[StatusEntry], color: bool) -> String {
    let mut lines = Vec::new();
    for entry in entries {
        let (text, ansi) = label(entry.state.code);
        let line = format!("{text:5}: {}", entry.name);
        lines.push(if color {
            format!("{ansi}{line}\x1b[0m")
        } else {
            line
        });
        if entry.state.code == StateCode::Conflict
            && let Some(message) = &entry.state.message
        {
            lines.push(format!("       {message}"));
        }
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Collect the status rows of every repository.
///
/// # Errors
///
/// Returns an error if a repository cannot be walked or a state cannot be read.
pub fn collect(setup: &CommandSetup, all: bool) -> Result<Vec<StatusEntry>> {
    let mut entries = Vec::new();
    for repo in &setup.repos {
        for dotfile in repo.contents()? {
            let state = dotfile.state()?;
            if all || needs_attention(state.code) {
                entries.push(StatusEntry {
                    name: dotfile.short_name(repo.home()).display().to_string(),
                    state,
                });
            }
        }
    }
    Ok(entries)
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if setup fails, a state cannot be read, or JSON
/// serialization fails.
pub fn run(global: &GlobalOpts, opts: &StatusOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let entries = collect(&setup, opts.all)?;

    if opts.json {
        let json = serde_json::to_string_pretty(&entries).context("serialize status")?;
        println!("{json}");
    } else {
        print!("{}", render(&entries, std::io::stdout().is_terminal()));
    }
    Ok(())
}
