//! Describe command - print a schema

use super::{load_schema, OutputFormat, Outcome};
use anyhow::{anyhow, Result};
use clap::Args;
use console::{style, Emoji};
use jsonvet_validate::{FieldDescriptor, Schema, TypeDescriptor};
use std::path::PathBuf;

static WARN: Emoji<'_, '_> = Emoji("⚠️ ", "! ");

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema document (.json or .toml)
    #[arg(short, long)]
    schema: PathBuf,

    /// Only describe this type
    #[arg(short = 't', long = "type")]
    type_name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Print the types of a schema with their fields and ordered rules.
pub fn describe(args: DescribeArgs) -> Result<Outcome> {
    let schema = load_schema(&args.schema)?;

    let types: Vec<&TypeDescriptor> = match &args.type_name {
        Some(name) => vec![schema
            .get(name)
            .ok_or_else(|| anyhow!("type `{}` is not defined in {}", name, args.schema.display()))?],
        None => schema.types().collect(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&types)?),
        OutputFormat::Text => {
            for descriptor in &types {
                print_type(&schema, descriptor);
            }
            for error in schema.lint() {
                println!("{} {}", WARN, style(error).yellow());
            }
        }
    }

    Ok(Outcome::Valid)
}

fn print_type(schema: &Schema, descriptor: &TypeDescriptor) {
    match &descriptor.parent {
        Some(parent) => println!(
            "{} {} {}",
            style(&descriptor.name).bold(),
            style(":").dim(),
            style(parent).cyan()
        ),
        None => println!("{}", style(&descriptor.name).bold()),
    }

    let (ancestors, _) = schema.ancestors(&descriptor.name);
    for ancestor in ancestors.iter().rev() {
        for field in &ancestor.fields {
            print_field(field, Some(&ancestor.name));
        }
    }
    for field in &descriptor.fields {
        print_field(field, None);
    }
    println!();
}

fn print_field(field: &FieldDescriptor, inherited_from: Option<&str>) {
    let mut notes = Vec::new();
    if let Some(type_name) = &field.element_type {
        notes.push(format!("type {}", type_name));
    }
    if let Some(label) = &field.label {
        notes.push(format!("label {}", label));
    }
    if let Some(name) = &field.display_name {
        notes.push(format!("name {:?}", name));
    }
    if let Some(parent) = inherited_from {
        notes.push(format!("from {}", parent));
    }

    let notes = if notes.is_empty() {
        String::new()
    } else {
        format!(" ({})", notes.join(", "))
    };
    println!("  {}{}", style(field.key()).cyan(), style(notes).dim());

    let mut rules: Vec<_> = field.rules.iter().collect();
    rules.sort_by_key(|rule| rule.order);
    for (i, rule) in rules.iter().enumerate() {
        println!("    {}. {}", i + 1, rule);
    }
}
