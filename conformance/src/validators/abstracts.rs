//! Abstract-overlay validator.

use anyhow::Context;
use classinit::{Error, Method, Pipeline, TypeDefinition, Value};

use super::{expect, expect_eq};
use crate::report::ConformanceReport;

const VALIDATOR: &str = "abstracts/overlay";

/// Checks that abstract members block instantiation until overridden.
///
/// # Errors
///
/// Returns an error if a fixture type cannot be constructed.
pub fn validate(pipeline: &Pipeline) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut v = Vec::new();

    let shape = pipeline
        .construct(
            TypeDefinition::new("Shape")
                .enforce_abstract()
                .body(|ns| ns.set("area", Value::Method(Method::abstract_method("area")))),
        )
        .context("declaring Shape")?;
    match shape.instantiate() {
        Err(Error::AbstractMember { names, .. }) => {
            expect_eq(&mut v, "Shape abstract members", names, vec!["area".to_string()]);
        }
        Err(err) => v.push(format!("Shape failed with the wrong error: {err}")),
        Ok(_) => v.push("Shape instantiated despite abstract area".into()),
    }

    let blob = pipeline
        .construct(TypeDefinition::new("Blob").base(&shape))
        .context("declaring Blob")?;
    expect(&mut v, "Blob inherits the overlay", blob.enforces_abstract());
    expect(&mut v, "Blob stays abstract", blob.instantiate().is_err());

    let square = pipeline
        .construct(TypeDefinition::new("Square").base(&shape).body(|ns| {
            ns.set("area", Value::Method(Method::new("area", |_| Ok(Value::Int(4)))))
        }))
        .context("declaring Square")?;
    expect(&mut v, "Square instantiates", square.instantiate().is_ok());

    report.conclude(
        VALIDATOR,
        "Abstract members gate instantiation",
        "Abstract overlay violations detected",
        v,
    );
    Ok(report)
}
