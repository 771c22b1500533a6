//! Namespace-factory propagation validator.

use std::sync::Arc;

use anyhow::Context;
use classinit::{ClassNamespace, Namespace, NamespaceFactory, Pipeline, TypeDefinition, Value};
use parking_lot::Mutex;

use super::{expect, expect_eq};
use crate::report::ConformanceReport;

const VALIDATOR: &str = "factory/propagation";

/// Counts every namespace it hands out.
fn counting(name: &str, made: &Arc<Mutex<usize>>) -> NamespaceFactory {
    let made = Arc::clone(made);
    NamespaceFactory::new(name, move || -> Box<dyn ClassNamespace> {
        *made.lock() += 1;
        Box::new(Namespace::new())
    })
}

/// Checks that a declared factory reaches every descendant until replaced.
///
/// # Errors
///
/// Returns an error if a fixture type cannot be constructed.
pub fn validate(pipeline: &Pipeline) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut v = Vec::new();

    let first = Arc::new(Mutex::new(0));
    let second = Arc::new(Mutex::new(0));

    let root = pipeline
        .construct(TypeDefinition::new("Root").namespace_factory(counting("first", &first)))
        .context("declaring Root")?;
    let child = pipeline
        .construct(TypeDefinition::new("Child").base(&root).body(|ns| ns.set("c", Value::Int(1))))
        .context("declaring Child")?;
    let grandchild = pipeline
        .construct(TypeDefinition::new("Grandchild").base(&child))
        .context("declaring Grandchild")?;
    expect_eq(&mut v, "namespaces from first factory", *first.lock(), 3);
    expect_eq(
        &mut v,
        "Grandchild advertised factory",
        grandchild.namespace_factory().map(|f| f.name().to_string()),
        Some("first".to_string()),
    );

    let replaced = pipeline
        .construct(
            TypeDefinition::new("Replaced")
                .base(&grandchild)
                .namespace_factory(counting("second", &second)),
        )
        .context("declaring Replaced")?;
    pipeline
        .construct(TypeDefinition::new("Below").base(&replaced))
        .context("declaring Below")?;
    expect_eq(&mut v, "namespaces from first factory after override", *first.lock(), 3);
    expect_eq(&mut v, "namespaces from second factory", *second.lock(), 2);

    let unrelated = pipeline
        .construct(TypeDefinition::new("Unrelated"))
        .context("declaring Unrelated")?;
    expect(&mut v, "plain types advertise no factory", unrelated.namespace_factory().is_none());

    report.conclude(
        VALIDATOR,
        "Namespace factories propagate to descendants",
        "Namespace factory violations detected",
        v,
    );
    Ok(report)
}
