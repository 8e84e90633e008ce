//! Dotfile tracking engine.
//!
//! Moves configuration files from `$HOME` into a repository directory and
//! links (or copies) them back, so the repository can be version-controlled
//! while every file stays usable where programs expect it.
//!
//! The public API is organised into layers:
//!
//! - **[`dotfile`]**: one tracked file, its derived [`State`](dotfile::State),
//!   and the `add`/`remove`/`enable`/`disable`/`sync` operations
//! - **[`operations`]**: filesystem mutations with dry-run suppression
//! - **[`repository`]**: path mapping, ignore rules, and enumeration
//! - **[`commands`]**: subcommand orchestration and per-file batching
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dotfile;
pub mod error;
pub mod fs;
pub mod logging;
pub mod operations;
pub mod repository;
