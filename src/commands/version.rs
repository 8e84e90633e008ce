//! Command: print version information.

/// The version string, preferring the one stamped in at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the dotlink version to stdout.
pub fn run() {
    println!("dotlink {}", version());
}
