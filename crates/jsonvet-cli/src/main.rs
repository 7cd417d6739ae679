//! `jsonvet` command-line validator

mod cli;
mod commands;

use clap::Parser;
use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli::init_tracing(cli.verbosity());

    match cli.execute() {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::from(2)
        }
    }
}
