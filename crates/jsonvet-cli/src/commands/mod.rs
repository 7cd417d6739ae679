//! CLI commands

mod check;
mod describe;

pub use check::{check, CheckArgs};
pub use describe::{describe, DescribeArgs};

use anyhow::{Context, Result};
use clap::ValueEnum;
use jsonvet_validate::Schema;
use std::path::Path;
use std::process::ExitCode;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything checked out
    Valid,
    /// At least one document had rule failures
    Failures,
    /// At least one document was not valid JSON
    Malformed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Valid => ExitCode::SUCCESS,
            Outcome::Failures => ExitCode::from(1),
            Outcome::Malformed => ExitCode::from(2),
        }
    }
}

/// Output format of a command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn load_schema(path: &Path) -> Result<Schema> {
    let schema = Schema::load(path)
        .with_context(|| format!("could not load schema {}", path.display()))?;
    tracing::debug!(path = %path.display(), types = schema.len(), "schema loaded");
    Ok(schema)
}
