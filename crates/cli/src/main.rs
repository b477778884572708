use std::process::ExitCode;

use clap::Parser;

mod commands;
mod terminal;

use commands::{Cli, Command};
use fprop_runtime::logging;

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Status(args) => commands::status::run(args),
        Command::Details(args) => commands::details::run(args),
        Command::Config(args) => commands::config::run(args),
        Command::Watch(args) => commands::watch::run(args),
    }
}
