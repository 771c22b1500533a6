//! Subclass-init hook scenarios: inheritance, overriding, cooperative
//! delegation, owner-scoped counters, multiple inheritance, decorators and
//! failure atomicity.

mod common;

use classinit::{Error, Pipeline, Scope, SubclassHook, TypeDefinition, TypeRef, Value, INIT_SUBCLASS};
use common::{hook, int_attr, setter, setter_only, with_hook};

// =============================================================================
// Single Inheritance
// =============================================================================

struct Chain {
    p: Pipeline,
    c: TypeRef,
}

/// `BaseC` sets `x = 0` on every subtype; `C` derives from it.
fn base_c() -> Chain {
    let p = Pipeline::default();
    let base = with_hook(&p, "BaseC", &[], setter("x", 0));
    let c = p.construct(TypeDefinition::new("C").base(&base)).unwrap();
    Chain { p, c }
}

#[test]
fn hook_runs_for_direct_subtype() {
    let Chain { c, .. } = base_c();
    assert_eq!(c.get_own("x"), Some(Value::Int(0)));
}

#[test]
fn hook_runs_for_indirect_subtype() {
    let Chain { p, c } = base_c();
    let d = p.construct(TypeDefinition::new("D").base(&c)).unwrap();
    assert_eq!(d.get_own("x"), Some(Value::Int(0)));
}

#[test]
fn hook_overwrites_body_member() {
    let Chain { p, c } = base_c();
    let e = p
        .construct(TypeDefinition::new("E").base(&c).body(|ns| ns.set("x", Value::Int(1))))
        .unwrap();
    assert_eq!(e.get_own("x"), Some(Value::Int(0)));
    assert!(e.attribute_order().contains("x"));
}

#[test]
fn overriding_hook_without_delegation_skips_ancestor() {
    let Chain { p, c } = base_c();
    let base_f = with_hook(&p, "BaseF", &[c.clone()], setter_only("y", 1));
    let f = p.construct(TypeDefinition::new("F").base(&base_f)).unwrap();
    assert_eq!(int_attr(&f, "y"), Some(1));
    assert_eq!(int_attr(&f, "x"), Some(0));
    assert!(!f.has_own("x"));
    assert!(c.lookup("y").is_none());
}

#[test]
fn delegating_hook_runs_ancestor_too() {
    let Chain { p, c } = base_c();
    let base_g = with_hook(&p, "BaseG", &[c.clone()], setter("y", 1));
    let g = p.construct(TypeDefinition::new("G").base(&base_g)).unwrap();
    assert_eq!(g.get_own("y"), Some(Value::Int(1)));
    assert_eq!(g.get_own("x"), Some(Value::Int(0)));
    assert!(c.lookup("y").is_none());
}

// =============================================================================
// Owner-Scoped State
// =============================================================================

/// Increments `counter` on the hook's declaring type.
fn bump_owner(counter: &'static str) -> impl Fn(&TypeRef) {
    move |owner: &TypeRef| {
        let current = owner.get_own(counter).and_then(|v| v.as_int()).unwrap_or(0);
        owner.set_attr(counter, current + 1);
    }
}

#[test]
fn hooks_update_their_declaring_type() {
    let p = Pipeline::default();
    let bump_y = bump_owner("y");
    let base_i = p
        .construct(TypeDefinition::new("BaseI").body(move |ns| {
            ns.set(
                INIT_SUBCLASS,
                Value::Hook(hook(move |ctx, kwargs, next| {
                    ctx.cls().set_attr("x", 0);
                    bump_y(ctx.owner());
                    next.call(kwargs)
                })),
            )?;
            ns.set("y", Value::Int(0))
        }))
        .unwrap();

    let i = p.construct(TypeDefinition::new("I").base(&base_i)).unwrap();
    assert_eq!(int_attr(&i, "x"), Some(0));
    assert_eq!(int_attr(&i, "y"), Some(1));

    let j = p.construct(TypeDefinition::new("J").base(&i)).unwrap();
    assert_eq!(j.get_own("x"), Some(Value::Int(0)));
    assert_eq!(int_attr(&i, "y"), Some(2));

    let bump_z = bump_owner("z");
    let base_k = p
        .construct(TypeDefinition::new("BaseK").base(&j).body(move |ns| {
            ns.set(
                INIT_SUBCLASS,
                Value::Hook(hook(move |ctx, kwargs, next| {
                    next.call(kwargs)?;
                    bump_z(ctx.owner());
                    Ok(())
                })),
            )?;
            ns.set("z", Value::Int(0))
        }))
        .unwrap();
    let k = p.construct(TypeDefinition::new("K").base(&base_k)).unwrap();

    assert_eq!(k.get_own("x"), Some(Value::Int(0)));
    assert_eq!(int_attr(&i, "y"), Some(4));
    assert_eq!(int_attr(&k, "z"), Some(1));
    assert!(j.lookup("z").is_none());
}

// =============================================================================
// Multiple Inheritance
// =============================================================================

#[test]
fn diamond_chain_sets_every_branch() {
    let p = Pipeline::default();
    let l = with_hook(&p, "L", &[], SubclassHook::new(|_, _, _| Ok(())));
    let base_m = with_hook(&p, "BaseM", &[l.clone()], setter("x", 0));
    let m = p.construct(TypeDefinition::new("M").base(&base_m)).unwrap();
    assert_eq!(int_attr(&m, "x"), Some(0));
    let base_n = with_hook(&p, "BaseN", &[l], setter("y", 1));
    let n = p.construct(TypeDefinition::new("N").base(&base_n)).unwrap();
    assert_eq!(int_attr(&n, "y"), Some(1));

    let base_o = with_hook(&p, "BaseO", &[m, n], setter("z", 2));
    let o = p.construct(TypeDefinition::new("O").base(&base_o)).unwrap();
    assert_eq!(o.get_own("x"), Some(Value::Int(0)));
    assert_eq!(o.get_own("y"), Some(Value::Int(1)));
    assert_eq!(o.get_own("z"), Some(Value::Int(2)));

    let mut hook_set: Vec<_> = o
        .own_member_names()
        .into_iter()
        .filter(|n| !o.attribute_order().contains(n))
        .collect();
    hook_set.sort();
    assert_eq!(hook_set, vec!["x", "y", "z"]);
}

// =============================================================================
// Decorators
// =============================================================================

#[test]
fn decorators_run_after_hooks_in_order() {
    let p = Pipeline::default();
    let t = p
        .construct(
            TypeDefinition::new("P")
                .body(|ns| ns.set(INIT_SUBCLASS, Value::Hook(setter("x", 0))))
                .decorator(|cls| {
                    cls.set_attr("x", 1);
                    Ok(cls)
                })
                .decorator(|cls| {
                    cls.set_attr("x", 2);
                    Ok(cls)
                }),
        )
        .unwrap();
    assert_eq!(int_attr(&t, "x"), Some(2));
}

#[test]
fn decorator_may_replace_the_type() {
    let p = Pipeline::default();
    let replacement = p.construct(TypeDefinition::new("Replacement")).unwrap();
    let r = replacement.clone();
    let mut scope = Scope::new();
    let bound = scope
        .declare(&p, TypeDefinition::new("Original").decorator(move |_| Ok(r)))
        .unwrap();
    assert_eq!(bound.name(), "Replacement");
    assert_eq!(scope.get_type("Original").map(|t| t.name()), Some("Replacement"));
}

// =============================================================================
// Failure Atomicity
// =============================================================================

#[test]
fn failing_hook_leaves_sentinel_bound() {
    let p = Pipeline::default();
    let mut scope = Scope::new();
    scope.bind("S", "sentinel");
    let base_s = scope
        .declare(
            &p,
            TypeDefinition::new("BaseS").body(|ns| {
                ns.set(
                    INIT_SUBCLASS,
                    Value::Hook(hook(|_, _, _| Err(Error::raised("KeyError", "xxx")))),
                )
            }),
        )
        .unwrap();

    let err = scope
        .declare(&p, TypeDefinition::new("S").base(&base_s))
        .unwrap_err();
    assert!(err.is_raised("KeyError"));
    assert_eq!(err.to_string(), "KeyError: xxx");
    assert_eq!(scope.get("S"), Some(&Value::from("sentinel")));
}

#[test]
fn side_effects_before_failure_are_kept() {
    let p = Pipeline::default();
    let bump = bump_owner("count");
    let root = with_hook(
        &p,
        "Root",
        &[],
        hook(move |ctx, kwargs, next| {
            bump(ctx.owner());
            next.call(kwargs)
        }),
    );
    let failing = with_hook(
        &p,
        "Failing",
        &[root.clone()],
        hook(|_, kwargs, next| {
            next.call(kwargs)?;
            Err(Error::raised("RuntimeError", "late"))
        }),
    );
    let before = int_attr(&root, "count");
    assert!(p.construct(TypeDefinition::new("Leaf").base(&failing)).is_err());
    assert_eq!(int_attr(&root, "count"), before.map(|n| n + 1));
}

// =============================================================================
// Extra Arguments
// =============================================================================

#[test]
fn kwargs_are_consumed_along_the_chain() {
    let p = Pipeline::default();
    let root = with_hook(
        &p,
        "Root",
        &[],
        hook(|ctx, mut kwargs, next| {
            if let Some(v) = kwargs.take("color") {
                ctx.cls().set_attr("color", v);
            }
            next.call(kwargs)
        }),
    );
    let mid = with_hook(
        &p,
        "Mid",
        &[root],
        hook(|ctx, mut kwargs, next| {
            if let Some(v) = kwargs.take("size") {
                ctx.cls().set_attr("size", v);
            }
            next.call(kwargs)
        }),
    );
    let leaf = p
        .construct(TypeDefinition::new("Leaf").base(&mid).kwarg("color", "red").kwarg("size", 3))
        .unwrap();
    assert_eq!(leaf.get_own("color"), Some(Value::from("red")));
    assert_eq!(leaf.get_own("size"), Some(Value::Int(3)));

    let err = p
        .construct(TypeDefinition::new("Bad").base(&mid).kwarg("weight", 1))
        .unwrap_err();
    assert!(matches!(err, Error::ChainDelegation { ref names, .. } if names == &["weight"]));
}

// =============================================================================
// Distant Ancestors
// =============================================================================

fn distant_receivers(middle_delegates: bool) -> Vec<String> {
    use std::sync::{Arc, Mutex};

    let p = Pipeline::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let top = with_hook(
        &p,
        "Top",
        &[],
        hook(move |ctx, kwargs, next| {
            log.lock().unwrap().push(ctx.cls().name().to_string());
            next.call(kwargs)
        }),
    );
    let plain = p.construct(TypeDefinition::new("Plain").base(&top)).unwrap();
    let middle_hook = if middle_delegates {
        SubclassHook::delegating()
    } else {
        SubclassHook::new(|_, _, _| Ok(()))
    };
    let middle = with_hook(&p, "Middle", &[plain], middle_hook);
    seen.lock().unwrap().clear();

    p.construct(TypeDefinition::new("Leaf").base(&middle)).unwrap();
    let receivers = seen.lock().unwrap().clone();
    receivers
}

#[test]
fn distant_hook_runs_once_when_all_delegate() {
    assert_eq!(distant_receivers(true), vec!["Leaf"]);
}

#[test]
fn distant_hook_skipped_when_intermediate_stops() {
    assert!(distant_receivers(false).is_empty());
}
