//! CLI argument parsing

use crate::commands::{self, CheckArgs, DescribeArgs, Outcome};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// jsonvet - validate JSON documents against declarative schemas
#[derive(Parser, Debug)]
#[command(name = "jsonvet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate JSON files against a type of a schema
    Check(CheckArgs),

    /// Print the types, fields and rules of a schema
    Describe(DescribeArgs),
}

impl Cli {
    /// Number of `-v` flags given.
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<Outcome> {
        match self.command {
            Commands::Check(args) => commands::check(args),
            Commands::Describe(args) => commands::describe(args),
        }
    }
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
