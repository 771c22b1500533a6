//! `classinit-conformance`: runs the pipeline conformance suite.
//!
//! Checks attribute-order recording, the subclass-init hook chain, descriptor
//! binding, namespace-factory propagation and the abstract overlay under the
//! selected pipeline configuration.
//!
//! **Usage:**
//! ```text
//! classinit-conformance [--config <file.toml>] [--binder-order <order>]
//!                       [--root-policy <policy>] [--format text|json] [-v]
//! ```
//!
//! Exits non-zero if any conformance check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use classinit_clients::{init_tracing, PipelineArgs};
use classinit_conformance::{run_all, ConformanceReport, Severity};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Run the classinit conformance suite.
#[derive(Parser)]
#[command(
    name = "classinit-conformance",
    about = "Validate the type-construction pipeline against its guarantees"
)]
struct Args {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn print_text(report: &ConformanceReport) -> usize {
    println!("classinit Conformance Report");
    println!("============================");
    println!();

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut warned = 0usize;

    for result in &report.results {
        let status = match result.severity {
            Severity::Pass => {
                passed += 1;
                "PASS"
            }
            Severity::Warning => {
                warned += 1;
                "WARN"
            }
            Severity::Failure => {
                failed += 1;
                "FAIL"
            }
        };
        println!("[{}] {}: {}", status, result.validator, result.message);
        for detail in &result.details {
            println!("       {}", detail);
        }
    }

    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        passed, warned, failed
    );
    failed
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let config = args.pipeline.resolve()?;
    let report = run_all(&config)?;

    let failed = match args.format {
        Format::Text => print_text(&report),
        Format::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize conformance report")?;
            println!("{json}");
            report.failure_count()
        }
    };

    if failed > 0 {
        eprintln!("Conformance FAILED: {} check(s) did not pass.", failed);
        process::exit(1);
    }

    if matches!(args.format, Format::Text) {
        println!("Conformance PASSED.");
    }
    Ok(())
}
