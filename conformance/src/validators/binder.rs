//! Descriptor-binder validator.

use std::sync::Arc;

use anyhow::Context;
use classinit::{
    BinderOrder, Descriptor, Pipeline, SubclassHook, TypeDefinition, TypeRef, Value,
    INIT_SUBCLASS,
};
use parking_lot::Mutex;

use super::{expect, expect_eq};
use crate::report::ConformanceReport;
use crate::scenarios::fields;

const VALIDATOR: &str = "binder/descriptors";

#[derive(Debug, Default)]
struct Probe {
    calls: Mutex<Vec<(String, String)>>,
}

impl Descriptor for Probe {
    fn bind_to_owner(&self, owner: &TypeRef, name: &str) -> classinit::Result<()> {
        self.calls
            .lock()
            .push((owner.name().to_string(), name.to_string()));
        Ok(())
    }
}

fn member(probe: &Arc<Probe>) -> Value {
    Value::Descriptor(Arc::clone(probe) as Arc<dyn Descriptor>)
}

/// Checks bind-once semantics, exact owner and name, and the configured
/// ordering relative to hooks.
///
/// # Errors
///
/// Returns an error if a fixture type cannot be constructed.
pub fn validate(pipeline: &Pipeline) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut v = Vec::new();

    let probe = Arc::new(Probe::default());
    let (a, b) = (member(&probe), member(&probe));
    pipeline
        .construct(TypeDefinition::new("Holder").body(move |ns| {
            ns.set("first", a)?;
            ns.set("plain", Value::Int(3))?;
            ns.set("second", b)
        }))
        .context("declaring Holder")?;
    expect_eq(
        &mut v,
        "bind calls",
        probe.calls.lock().clone(),
        vec![
            ("Holder".to_string(), "first".to_string()),
            ("Holder".to_string(), "second".to_string()),
        ],
    );

    let (record, field) = fields::declare_record(pipeline).context("declaring Record")?;
    expect_eq(&mut v, "self-naming field name", field.name(), Some("a".to_string()));
    let mut obj = record.instantiate().context("instantiating Record")?;
    field.store(&mut obj, 4).context("writing Record.a")?;
    expect_eq(
        &mut v,
        "self-naming field value",
        field.load(&obj).ok(),
        Some(Value::Int(4)),
    );

    ordering(pipeline, &mut v)?;

    report.conclude(
        VALIDATOR,
        "Descriptors are bound once with their owner and name",
        "Descriptor binding violations detected",
        v,
    );
    Ok(report)
}

fn ordering(pipeline: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<()> {
    let probe = Arc::new(Probe::default());
    let watched = Arc::clone(&probe);
    let base = pipeline
        .construct(TypeDefinition::new("Watcher").body(move |ns| {
            ns.set(
                INIT_SUBCLASS,
                Value::Hook(SubclassHook::new(move |ctx, kwargs, next| {
                    let bound = !watched.calls.lock().is_empty();
                    ctx.cls().set_attr("bound_before_hook", bound);
                    next.call(kwargs)
                })),
            )
        }))
        .context("declaring Watcher")?;
    let field = member(&probe);
    let watched = pipeline
        .construct(TypeDefinition::new("Watched").base(&base).body(move |ns| ns.set("f", field)))
        .context("declaring Watched")?;

    let expected = pipeline.config().binder_order == BinderOrder::BeforeHooks;
    expect_eq(
        v,
        "hook observed binding",
        watched.get_own("bound_before_hook"),
        Some(Value::Bool(expected)),
    );
    expect(v, "Watched.f bound exactly once", probe.calls.lock().len() == 1);
    Ok(())
}
