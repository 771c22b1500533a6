//! Descriptor binding: once per member, with the exact owner and name.

mod common;

use classinit::{
    BinderOrder, Error, Pipeline, PipelineConfig, RootPolicy, Scope, TypeDefinition, Value,
};
use common::{descriptor_value, hook, with_hook, RecordingDescriptor};

#[test]
fn each_descriptor_bound_once_with_declared_name() {
    let first = RecordingDescriptor::new();
    let second = RecordingDescriptor::new();
    let (f, s) = (first.clone(), second.clone());
    let t = Pipeline::default()
        .construct(TypeDefinition::new("Record").body(move |ns| {
            ns.set("plain", Value::Int(1))?;
            ns.set("first", descriptor_value(&f))?;
            ns.set("second", descriptor_value(&s))
        }))
        .unwrap();
    assert_eq!(first.calls(), vec![("Record".to_string(), "first".to_string())]);
    assert_eq!(second.calls(), vec![("Record".to_string(), "second".to_string())]);
    assert!(matches!(t.get_own("first"), Some(Value::Descriptor(_))));
}

#[test]
fn same_descriptor_under_two_names_is_bound_twice() {
    let shared = RecordingDescriptor::new();
    let d = shared.clone();
    Pipeline::default()
        .construct(TypeDefinition::new("Alias").body(move |ns| {
            ns.set("a", descriptor_value(&d))?;
            ns.set("b", descriptor_value(&d))
        }))
        .unwrap();
    assert_eq!(
        shared.calls(),
        vec![
            ("Alias".to_string(), "a".to_string()),
            ("Alias".to_string(), "b".to_string()),
        ]
    );
}

#[test]
fn inherited_descriptors_are_not_rebound() {
    let d = RecordingDescriptor::new();
    let dd = d.clone();
    let p = Pipeline::default();
    let base = p
        .construct(TypeDefinition::new("Base").body(move |ns| ns.set("field", descriptor_value(&dd))))
        .unwrap();
    p.construct(TypeDefinition::new("Sub").base(&base)).unwrap();
    assert_eq!(d.calls().len(), 1);
}

#[test]
fn descriptors_set_by_hooks_are_not_bound() {
    let d = RecordingDescriptor::new();
    let dd = d.clone();
    let p = Pipeline::default();
    let base = with_hook(
        &p,
        "Base",
        &[],
        hook(move |ctx, kwargs, next| {
            ctx.cls().set_attr("late", descriptor_value(&dd));
            next.call(kwargs)
        }),
    );
    let sub = p.construct(TypeDefinition::new("Sub").base(&base)).unwrap();
    assert!(sub.has_own("late"));
    assert!(d.calls().is_empty());
}

#[test]
fn failing_bind_aborts_declaration() {
    let bad = RecordingDescriptor::failing("ValueError");
    let after = RecordingDescriptor::new();
    let (b, a) = (bad.clone(), after.clone());
    let mut scope = Scope::new();
    let err = scope
        .declare(
            &Pipeline::default(),
            TypeDefinition::new("Broken").body(move |ns| {
                ns.set("bad", descriptor_value(&b))?;
                ns.set("after", descriptor_value(&a))
            }),
        )
        .unwrap_err();
    assert!(err.is_raised("ValueError"));
    assert!(after.calls().is_empty());
    assert!(scope.get("Broken").is_none());
}

// =============================================================================
// Binder Ordering
// =============================================================================

/// Hooks record whether `field` was already bound when they ran.
fn observe_binding(order: BinderOrder) -> bool {
    let d = RecordingDescriptor::new();
    let probe = d.clone();
    let p = Pipeline::new(PipelineConfig {
        binder_order: order,
        root_policy: RootPolicy::Strict,
    });
    let base = with_hook(
        &p,
        "Base",
        &[],
        hook(move |ctx, kwargs, next| {
            ctx.cls().set_attr("seen_bound", !probe.calls().is_empty());
            next.call(kwargs)
        }),
    );
    let dd = d.clone();
    let sub = p
        .construct(TypeDefinition::new("Sub").base(&base).body(move |ns| ns.set("field", descriptor_value(&dd))))
        .unwrap();
    assert_eq!(d.calls().len(), 1);
    sub.get_own("seen_bound") == Some(Value::Bool(true))
}

#[test]
fn binder_after_hooks_by_default() {
    assert!(!observe_binding(BinderOrder::default()));
}

#[test]
fn binder_before_hooks_when_configured() {
    assert!(observe_binding(BinderOrder::BeforeHooks));
}

#[test]
fn bind_sees_hook_members_after_hooks() {
    #[derive(Debug)]
    struct NeedsTag;
    impl classinit::Descriptor for NeedsTag {
        fn bind_to_owner(&self, owner: &classinit::TypeRef, name: &str) -> classinit::Result<()> {
            owner.get_attr("tag").map(|_| ()).map_err(|_| Error::raised("LookupError", name))
        }
    }

    let config = |binder_order| PipelineConfig {
        binder_order,
        ..PipelineConfig::default()
    };
    let declare = |order| {
        let p = Pipeline::new(config(order));
        let base = with_hook(
            &p,
            "Base",
            &[],
            hook(|ctx, kwargs, next| {
                ctx.cls().set_attr("tag", "t");
                next.call(kwargs)
            }),
        );
        p.construct(
            TypeDefinition::new("Sub")
                .base(&base)
                .body(|ns| ns.set("field", Value::descriptor(NeedsTag))),
        )
    };
    assert!(declare(BinderOrder::AfterHooks).is_ok());
    assert!(declare(BinderOrder::BeforeHooks).unwrap_err().is_raised("LookupError"));
}

// =============================================================================
// Interaction With Hooks
// =============================================================================

#[test]
fn descriptor_replaced_by_hook_is_not_bound() {
    let d = RecordingDescriptor::new();
    let dd = d.clone();
    let p = Pipeline::default();
    let base = with_hook(
        &p,
        "Base",
        &[],
        hook(|ctx, kwargs, next| {
            ctx.cls().set_attr("field", Value::Int(0));
            next.call(kwargs)
        }),
    );
    let sub = p
        .construct(TypeDefinition::new("Sub").base(&base).body(move |ns| ns.set("field", descriptor_value(&dd))))
        .unwrap();
    assert_eq!(sub.get_own("field"), Some(Value::Int(0)));
    assert!(d.calls().is_empty());
}

#[test]
fn descriptor_swapped_by_hook_binds_replacement() {
    let declared = RecordingDescriptor::new();
    let replacement = RecordingDescriptor::new();
    let (dd, rr) = (declared.clone(), replacement.clone());
    let p = Pipeline::default();
    let base = with_hook(
        &p,
        "Base",
        &[],
        hook(move |ctx, kwargs, next| {
            ctx.cls().set_attr("field", descriptor_value(&rr));
            next.call(kwargs)
        }),
    );
    p.construct(TypeDefinition::new("Sub").base(&base).body(move |ns| ns.set("field", descriptor_value(&dd))))
        .unwrap();
    assert!(declared.calls().is_empty());
    assert_eq!(replacement.calls(), vec![("Sub".to_string(), "field".to_string())]);
}

#[test]
fn failing_hook_skips_binding() {
    let d = RecordingDescriptor::new();
    let dd = d.clone();
    let p = Pipeline::default();
    let base = with_hook(
        &p,
        "Base",
        &[],
        hook(|_, _, _| Err(Error::raised("KeyError", "xxx"))),
    );
    let mut scope = Scope::new();
    let err = scope
        .declare(
            &p,
            TypeDefinition::new("Sub").base(&base).body(move |ns| ns.set("field", descriptor_value(&dd))),
        )
        .unwrap_err();
    assert!(err.is_raised("KeyError"));
    assert!(d.calls().is_empty());
    assert!(scope.get("Sub").is_none());
}
