//! `dotlink` binary: parse arguments, set up logging, dispatch.
use anyhow::Result;
use clap::Parser;

use dotlink::cli::{Cli, Command};
use dotlink::commands;
use dotlink::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let name = args.command.name();
    init_subscriber(args.verbose, name);
    let log = Logger::new(name);

    match &args.command {
        Command::Add(opts) => commands::add::run(&args.global, opts, &log)?,
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log)?,
        Command::Enable(opts) => commands::enable::run(&args.global, opts, &log)?,
        Command::Disable(opts) => commands::disable::run(&args.global, opts, &log)?,
        Command::Sync(opts) => commands::sync::run(&args.global, opts, &log)?,
        Command::Status(opts) => return commands::status::run(&args.global, opts, &log),
        Command::Version => {
            commands::version::run();
            return Ok(());
        }
    }
    commands::finish(&log)
}
