//! `classinit-describe`: builds the reference type hierarchies and dumps
//! their metadata.
//!
//! **Outputs:** one JSON document mapping each scenario name to the
//! descriptions of its types (name, MRO, attribute order, own members,
//! advertised namespace factory, abstract members). Written to stdout, or to
//! `<out>` when given.
//!
//! **Usage:**
//! ```text
//! classinit-describe [--out <file.json>] [--config <file.toml>] [-v]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use classinit::{Pipeline, TypeDescription};
use classinit_clients::{init_tracing, PipelineArgs};
use classinit_conformance::scenarios;

/// Dump metadata of the reference type hierarchies.
#[derive(Parser)]
#[command(
    name = "classinit-describe",
    about = "Build the reference hierarchies and print their metadata as JSON"
)]
struct Args {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let pipeline = Pipeline::new(args.pipeline.resolve()?);
    let built = scenarios::build_all(&pipeline)?;

    let dump: BTreeMap<&str, Vec<TypeDescription>> = built
        .iter()
        .map(|s| (s.name, s.types.iter().map(|t| t.describe()).collect()))
        .collect();
    let json = serde_json::to_string_pretty(&dump).context("Failed to serialize descriptions")?;

    match &args.out {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("  Written: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
