//! Check command - validate JSON files

use super::{load_schema, OutputFormat, Outcome};
use anyhow::{bail, Context, Result};
use clap::Args;
use console::{style, Emoji};
use jsonvet_validate::{Locale, ValidationReport, Validator, ValidatorConfig};
use serde::Serialize;
use std::path::PathBuf;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "+ ");
static WARN: Emoji<'_, '_> = Emoji("⚠️ ", "! ");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "x ");

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (.json or .toml)
    #[arg(short, long)]
    schema: PathBuf,

    /// Name of the type the documents must conform to
    #[arg(short = 't', long = "type")]
    type_name: String,

    /// Locale for messages and labels (defaults to JSONVET_LOCALE, then the host locale)
    #[arg(short, long)]
    locale: Option<String>,

    /// Directory with message and label files
    #[arg(short, long)]
    resources: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// JSON documents to validate
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    valid: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

/// Validate every file and print the failures.
pub fn check(args: CheckArgs) -> Result<Outcome> {
    let schema = load_schema(&args.schema)?;
    if !schema.contains(&args.type_name) {
        bail!(
            "type `{}` is not defined in {}",
            args.type_name,
            args.schema.display()
        );
    }

    let mut config = ValidatorConfig::from_env();
    if let Some(locale) = args.locale {
        config.locale = Some(Locale::new(locale));
    }
    if let Some(dir) = args.resources {
        config.resource_dir = Some(dir);
    }
    let validator = Validator::from_config(&config);

    let mut reports = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("could not read {}", file.display()))?;
        let report = validator.validate_str(&text, &schema, &args.type_name);
        tracing::info!(
            file = %file.display(),
            failures = report.len(),
            "document checked"
        );
        reports.push((file.display().to_string(), report));
    }

    match args.format {
        OutputFormat::Text => print_text(&reports),
        OutputFormat::Json => {
            let out: Vec<_> = reports
                .iter()
                .map(|(file, report)| FileReport {
                    file: file.clone(),
                    valid: report.is_valid(),
                    report,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(outcome(reports.iter().map(|(_, report)| report)))
}

fn print_text(reports: &[(String, ValidationReport)]) {
    for (file, report) in reports {
        if let Some(err) = report.decode_error() {
            println!("{} {} {}", ERROR, style(file).bold(), style(err).red());
            continue;
        }

        if report.is_valid() {
            println!("{} {}", CHECK, style(file).bold());
        } else {
            println!(
                "{} {} {}",
                ERROR,
                style(file).bold(),
                style(format!("({} failure(s))", report.len())).red()
            );
            for failure in report {
                println!(
                    "    {} {} {}",
                    style(&failure.path).cyan(),
                    style(format!("[{}]", failure.rule)).dim(),
                    failure.message
                );
            }
        }

        for diagnostic in report.diagnostics() {
            println!("    {} {}", WARN, style(diagnostic).yellow());
        }
    }
}

/// Worst outcome over all reports: malformed input beats failures.
fn outcome<'a>(reports: impl Iterator<Item = &'a ValidationReport>) -> Outcome {
    reports.fold(Outcome::Valid, |worst, report| {
        match (worst, report.decode_error().is_some(), report.is_valid()) {
            (Outcome::Malformed, _, _) | (_, true, _) => Outcome::Malformed,
            (_, false, false) => Outcome::Failures,
            (worst, false, true) => worst,
        }
    })
}
