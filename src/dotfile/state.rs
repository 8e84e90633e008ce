//! Derived relationship between a home path and its repository copy.
use serde::Serialize;
use std::fmt;

/// Which relationship currently holds between `name` and `target`.
///
/// # Examples
///
/// ```
/// use dotlink::dotfile::StateCode;
///
/// assert_eq!(StateCode::Conflict.to_string(), "conflict");
/// assert!(StateCode::Missing.is_syncable());
/// assert!(!StateCode::Link.is_syncable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateCode {
    /// Nothing at the home path, or nothing in the repository to link to.
    Missing,
    /// The home path is a symlink to the repository copy.
    Link,
    /// The home path is a regular file identical to the repository copy.
    Copy,
    /// The home path holds something other than the repository copy.
    Conflict,
    /// The repository copy is itself a symlink, managed elsewhere.
    External,
}

impl StateCode {
    /// Lowercase name used in messages and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Link => "link",
            Self::Copy => "copy",
            Self::Conflict => "conflict",
            Self::External => "external",
        }
    }

    /// Whether `sync` is defined for this state.
    #[must_use]
    pub const fn is_syncable(self) -> bool {
        matches!(self, Self::Missing | Self::Conflict)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`StateCode`] with an optional explanation for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    /// The relationship.
    #[serde(rename = "state")]
    pub code: StateCode,
    /// Why the state was chosen, when that is not obvious from the code.
    pub message: Option<String>,
}

impl State {
    /// A state without explanation.
    #[must_use]
    pub const fn new(code: StateCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// A state with an explanation.
    #[must_use]
    pub fn with_message(code: StateCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {msg}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let state = State::with_message(StateCode::Conflict, "source and target are not the same file");
        assert_eq!(
            state.to_string(),
            "conflict: source and target are not the same file"
        );
        assert_eq!(State::new(StateCode::Link).to_string(), "link");
    }

    #[test]
    fn only_missing_and_conflict_are_syncable() {
        let syncable: Vec<StateCode> = [
            StateCode::Missing,
            StateCode::Link,
            StateCode::Copy,
            StateCode::Conflict,
            StateCode::External,
        ]
        .into_iter()
        .filter(|c| c.is_syncable())
        .collect();
        assert_eq!(syncable, vec![StateCode::Missing, StateCode::Conflict]);
    }
}
