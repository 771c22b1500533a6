//! classinit conformance suite.
//!
//! Runs the pipeline's behavioral guarantees against a [`Pipeline`] built from
//! a given [`PipelineConfig`] and aggregates the outcome in a
//! [`ConformanceReport`]. The `classinit-conformance` binary prints it.
//!
//! # Conformance Scope
//!
//! | Validator | Guarantee |
//! |-----------|-----------|
//! | `order/attribute` | Recorded order equals body write order, markers first |
//! | `hooks/chain` | Hooks run along the linearized chain; skipped links stay skipped; failures leave the scope untouched |
//! | `binder/descriptors` | Each descriptor bound once, with exact owner and name, in the configured order |
//! | `factory/propagation` | A declared namespace factory reaches every descendant until replaced |
//! | `abstracts/overlay` | Abstract members block instantiation until overridden |
//!
//! # Entry Point
//!
//! ```
//! use classinit::PipelineConfig;
//! use classinit_conformance::run_all;
//!
//! let report = run_all(&PipelineConfig::default()).unwrap();
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod scenarios;
pub mod validators;

use classinit::{Pipeline, PipelineConfig};
use tracing::info;

pub use report::{ConformanceReport, Severity, TestResult};

/// Runs all conformance validators and returns the aggregated report.
///
/// Validators are run in this order:
/// 1. Attribute order
/// 2. Hook chain
/// 3. Descriptor binder
/// 4. Namespace-factory propagation
/// 5. Abstract overlay
///
/// # Errors
///
/// Returns an error only if a fixture type cannot be constructed at all.
pub fn run_all(config: &PipelineConfig) -> anyhow::Result<ConformanceReport> {
    let pipeline = Pipeline::new(*config);
    let mut report = ConformanceReport::new();

    report.extend(validators::order::validate(&pipeline)?);
    report.extend(validators::hooks::validate(&pipeline)?);
    report.extend(validators::binder::validate(&pipeline)?);
    report.extend(validators::factory::validate(&pipeline)?);
    report.extend(validators::abstracts::validate(&pipeline)?);

    info!(
        checks = report.results.len(),
        failures = report.failure_count(),
        "conformance run complete"
    );
    Ok(report)
}
