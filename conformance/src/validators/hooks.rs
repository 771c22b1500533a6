//! Hook-chain validator: the reference subclass-init scenarios.

use std::sync::Arc;

use anyhow::Context;
use classinit::{
    Error, Pipeline, RootPolicy, Scope, SubclassHook, TypeDefinition, TypeRef, Value,
    INIT_SUBCLASS,
};
use parking_lot::Mutex;

use super::{expect, expect_eq};
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "hooks/chain";

fn hooked(
    pipeline: &Pipeline,
    name: &str,
    bases: &[TypeRef],
    hook: SubclassHook,
) -> anyhow::Result<TypeRef> {
    pipeline
        .construct(
            TypeDefinition::new(name)
                .bases(bases)
                .body(move |ns| ns.set(INIT_SUBCLASS, Value::Hook(hook))),
        )
        .with_context(|| format!("declaring {name}"))
}

fn set(name: &'static str, value: i64, delegate: bool) -> SubclassHook {
    SubclassHook::new(move |ctx, kwargs, next| {
        ctx.cls().set_attr(name, value);
        if delegate {
            next.call(kwargs)
        } else {
            Ok(())
        }
    })
}

fn plain(pipeline: &Pipeline, name: &str, base: &TypeRef) -> anyhow::Result<TypeRef> {
    pipeline
        .construct(TypeDefinition::new(name).base(base))
        .with_context(|| format!("declaring {name}"))
}

fn int(t: &TypeRef, name: &str) -> Option<i64> {
    t.lookup(name).and_then(|v| v.as_int())
}

fn own(t: &TypeRef, name: &str) -> Option<i64> {
    t.get_own(name).and_then(|v| v.as_int())
}

/// Runs the single-inheritance, counter, diamond, failure, distant-ancestor
/// and root-policy scenarios.
///
/// # Errors
///
/// Returns an error if a fixture type cannot be constructed.
pub fn validate(pipeline: &Pipeline) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut v = Vec::new();

    single_inheritance(pipeline, &mut v)?;
    owner_counters(pipeline, &mut v)?;
    diamond(pipeline, &mut v)?;
    distant_ancestor(pipeline, &mut v)?;
    failure_atomicity(pipeline, &mut v)?;
    let dropped = root_policy(pipeline, &mut v)?;

    report.conclude(
        VALIDATOR,
        "Subclass-init hooks follow the linearized chain",
        "Hook chain violations detected",
        v,
    );
    if dropped {
        report.push(TestResult::warn(
            VALIDATOR,
            "Permissive root drops unconsumed extra arguments silently",
        ));
    }
    Ok(report)
}

fn single_inheritance(p: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<()> {
    let base_c = hooked(p, "BaseC", &[], set("x", 0, true))?;
    let c = plain(p, "C", &base_c)?;
    expect_eq(v, "C.x", int(&c, "x"), Some(0));

    let d = plain(p, "D", &c)?;
    expect_eq(v, "D own x", own(&d, "x"), Some(0));

    let e = p
        .construct(TypeDefinition::new("E").base(&c).body(|ns| ns.set("x", Value::Int(1))))
        .context("declaring E")?;
    expect_eq(v, "E own x after hook", own(&e, "x"), Some(0));

    let base_f = hooked(p, "BaseF", &[c.clone()], set("y", 1, false))?;
    let f = plain(p, "F", &base_f)?;
    expect_eq(v, "F.y", int(&f, "y"), Some(1));
    expect_eq(v, "F.x", int(&f, "x"), Some(0));
    expect(v, "F must not own x when BaseF does not delegate", !f.has_own("x"));

    let base_g = hooked(p, "BaseG", &[c.clone()], set("y", 1, true))?;
    let g = plain(p, "G", &base_g)?;
    expect_eq(v, "G own y", own(&g, "y"), Some(1));
    expect_eq(v, "G own x", own(&g, "x"), Some(0));
    expect(v, "C must not gain y", c.lookup("y").is_none());
    Ok(())
}

fn bump(owner: &TypeRef, counter: &str) {
    let n = owner.get_own(counter).and_then(|v| v.as_int()).unwrap_or(0);
    owner.set_attr(counter.to_string(), n + 1);
}

fn owner_counters(p: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<()> {
    let base_i = p
        .construct(TypeDefinition::new("BaseI").body(|ns| {
            ns.set(
                INIT_SUBCLASS,
                Value::Hook(SubclassHook::new(|ctx, kwargs, next| {
                    ctx.cls().set_attr("x", 0);
                    bump(ctx.owner(), "y");
                    next.call(kwargs)
                })),
            )?;
            ns.set("y", Value::Int(0))
        }))
        .context("declaring BaseI")?;
    let i = plain(p, "I", &base_i)?;
    expect_eq(v, "I.y after I", int(&i, "y"), Some(1));
    let j = plain(p, "J", &i)?;
    expect_eq(v, "J own x", own(&j, "x"), Some(0));
    expect_eq(v, "I.y after J", int(&i, "y"), Some(2));

    let base_k = p
        .construct(TypeDefinition::new("BaseK").base(&j).body(|ns| {
            ns.set(
                INIT_SUBCLASS,
                Value::Hook(SubclassHook::new(|ctx, kwargs, next| {
                    next.call(kwargs)?;
                    bump(ctx.owner(), "z");
                    Ok(())
                })),
            )?;
            ns.set("z", Value::Int(0))
        }))
        .context("declaring BaseK")?;
    let k = plain(p, "K", &base_k)?;
    expect_eq(v, "K own x", own(&k, "x"), Some(0));
    expect_eq(v, "I.y after K", int(&i, "y"), Some(4));
    expect_eq(v, "K.z", int(&k, "z"), Some(1));
    expect(v, "J must not gain z", j.lookup("z").is_none());
    Ok(())
}

fn diamond(p: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<()> {
    let l = hooked(p, "L", &[], SubclassHook::new(|_, _, _| Ok(())))?;
    let base_m = hooked(p, "BaseM", &[l.clone()], set("x", 0, true))?;
    let m = plain(p, "M", &base_m)?;
    let base_n = hooked(p, "BaseN", &[l], set("y", 1, true))?;
    let n = plain(p, "N", &base_n)?;
    let base_o = hooked(p, "BaseO", &[m, n], set("z", 2, true))?;
    let o = plain(p, "O", &base_o)?;
    for (name, value) in [("x", 0), ("y", 1), ("z", 2)] {
        expect_eq(v, &format!("O own {name}"), own(&o, name), Some(value));
    }
    Ok(())
}

fn distant_ancestor(p: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<()> {
    for delegate in [true, false] {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&calls);
        let top = hooked(
            p,
            "Top",
            &[],
            SubclassHook::new(move |ctx, kwargs, next| {
                log.lock().push(ctx.cls().name().to_string());
                next.call(kwargs)
            }),
        )?;
        let between = plain(p, "Between", &top)?;
        let gate = if delegate {
            SubclassHook::delegating()
        } else {
            SubclassHook::new(|_, _, _| Ok(()))
        };
        let middle = hooked(p, "Middle", &[between], gate)?;
        calls.lock().clear();
        plain(p, "Leaf", &middle)?;
        let expected: Vec<String> = if delegate { vec!["Leaf".into()] } else { Vec::new() };
        expect_eq(
            v,
            &format!("distant hook receivers (delegating={delegate})"),
            calls.lock().clone(),
            expected,
        );
    }
    Ok(())
}

fn failure_atomicity(p: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<()> {
    let mut scope = Scope::new();
    scope.bind("S", "sentinel");
    let base_s = hooked(
        p,
        "BaseS",
        &[],
        SubclassHook::new(|_, _, _| Err(Error::raised("KeyError", "xxx"))),
    )?;
    match scope.declare(p, TypeDefinition::new("S").base(&base_s)) {
        Ok(_) => v.push("declaring S should fail".into()),
        Err(err) => expect(v, "S fails with the hook's own KeyError", err.is_raised("KeyError")),
    }
    expect_eq(
        v,
        "S binding after failure",
        scope.get("S").cloned(),
        Some(Value::from("sentinel")),
    );
    Ok(())
}

/// Returns true when the root dropped leftover arguments without failing.
fn root_policy(p: &Pipeline, v: &mut Vec<String>) -> anyhow::Result<bool> {
    let base = hooked(p, "Forwarding", &[], SubclassHook::delegating())?;
    let outcome = p.construct(TypeDefinition::new("Extra").base(&base).kwarg("unused", 1));
    match (p.config().root_policy, outcome) {
        (RootPolicy::Strict, Err(Error::ChainDelegation { names, .. })) => {
            expect_eq(v, "unconsumed names", names, vec!["unused".to_string()]);
        }
        (RootPolicy::Permissive, Ok(_)) => return Ok(true),
        (policy, Ok(_)) => v.push(format!("{policy:?} root accepted leftover arguments")),
        (policy, Err(err)) => v.push(format!("{policy:?} root failed unexpectedly: {err}")),
    }
    Ok(false)
}
