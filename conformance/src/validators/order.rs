//! Attribute-order validator.

use anyhow::Context;
use classinit::{Pipeline, SubclassHook, TypeDefinition, Value, INIT_SUBCLASS};

use super::{expect, expect_eq};
use crate::report::ConformanceReport;
use crate::scenarios::ordering;

const VALIDATOR: &str = "order/attribute";

/// Checks that recorded order equals body write order, markers first.
///
/// # Errors
///
/// Returns an error if a fixture type cannot be constructed.
pub fn validate(pipeline: &Pipeline) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut violations = Vec::new();

    let t = ordering::declare(pipeline).context("declaring AttributeOrder")?;
    let mut expected = vec!["__module__", "__qualname__"];
    expected.extend(ordering::BODY_KEYS);
    expect_eq(
        &mut violations,
        "AttributeOrder order",
        t.attribute_order().iter().collect::<Vec<_>>(),
        expected,
    );

    let overwritten = pipeline
        .construct(TypeDefinition::new("Rewritten").body(|ns| {
            ns.set("z", Value::Int(0))?;
            ns.set("a", Value::Int(0))?;
            ns.set("z", Value::Int(1))
        }))
        .context("declaring Rewritten")?;
    expect_eq(
        &mut violations,
        "overwrite keeps first position",
        overwritten.attribute_order().body_keys().collect::<Vec<_>>(),
        vec!["z", "a"],
    );
    expect_eq(
        &mut violations,
        "overwrite stores last value",
        overwritten.get_own("z"),
        Some(Value::Int(1)),
    );

    let base = pipeline
        .construct(TypeDefinition::new("Stamping").body(|ns| {
            ns.set(
                INIT_SUBCLASS,
                Value::Hook(SubclassHook::new(|ctx, kwargs, next| {
                    ctx.cls().set_attr("stamped", true);
                    next.call(kwargs)
                })),
            )
        }))
        .context("declaring Stamping")?;
    let stamped = pipeline
        .construct(TypeDefinition::new("Stamped").base(&base).body(|ns| ns.set("k", Value::Int(1))))
        .context("declaring Stamped")?;
    expect(
        &mut violations,
        "hook-set member leaked into attribute order",
        !stamped.attribute_order().contains("stamped") && stamped.has_own("stamped"),
    );

    report.conclude(
        VALIDATOR,
        "Attribute order equals body write order",
        "Attribute order violations detected",
        violations,
    );
    Ok(report)
}
