//! # formcheck-lessons
//!
//! Validates a candidate against one of the lesson forms and prints either
//! the validated data or the messages each input would show.

mod lessons;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::Parser;
use formcheck::prelude::*;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "formcheck-lessons", version, about, long_about = None)]
struct Cli {
    /// Lesson form to validate against (1 basic, 2 advanced, 3 async, 4 nested).
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
    lesson: u8,

    /// JSON file holding the candidate; `-` reads stdin.
    #[arg(short, long, conflicts_with = "fields")]
    input: Option<PathBuf>,

    /// Named form input, e.g. `--field personalInfo.firstName=Ada`. Repeatable.
    #[arg(short = 'f', long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,

    /// Report every failing constraint of each input instead of the first.
    #[arg(long)]
    all_errors: bool,

    /// Latency of the simulated username lookup (lesson 3).
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let schema = lesson_schema(cli.lesson, Duration::from_millis(cli.delay_ms))?;
    let candidate = read_candidate(&cli)?;

    let options = if cli.all_errors {
        ValidationOptions::all_failures()
    } else {
        ValidationOptions::default()
    };
    let session = FormSession::new(schema).with_options(options);

    tracing::info!(lesson = cli.lesson, "submitting candidate");
    match session.submit(&candidate).await {
        Submission::Accepted(value) => {
            println!("Validated Data:");
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Submission::Rejected(errors) => {
            eprintln!("{}", formcheck::format::prettify_error(&errors));
            if errors.has_check_failures() {
                eprintln!("Some checks could not be performed; try again later.");
            }
            println!("{}", serde_json::to_string_pretty(&errors.tree())?);
            Ok(ExitCode::from(1))
        }
        Submission::Superseded => bail!("submission was superseded"),
    }
}

fn lesson_schema(lesson: u8, delay: Duration) -> Result<Schema> {
    let schema = match lesson {
        1 => lessons::basic(),
        2 => lessons::advanced().context("building lesson 2 patterns")?,
        3 => lessons::availability(delay),
        4 => {
            let year = chrono::Local::now().year();
            lessons::nested(year).context("building lesson 4 patterns")?
        }
        other => bail!("unknown lesson {other}"),
    };
    Ok(schema)
}

fn read_candidate(cli: &Cli) -> Result<Value> {
    if let Some(path) = &cli.input {
        let text = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading candidate from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("reading candidate from {}", path.display()))?
        };
        return Ok(text.to_candidate()?);
    }

    let mut pairs = Vec::with_capacity(cli.fields.len());
    for field in &cli.fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("expected NAME=VALUE, got `{field}`"))?;
        pairs.push((name.to_string(), Value::String(value.to_string())));
    }
    Ok(from_form_fields(pairs)?)
}
