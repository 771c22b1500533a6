//! Abstract-enforcement overlay.

mod common;

use classinit::{Descriptor, Error, Method, Pipeline, TypeDefinition, TypeRef, Value};
use common::{descriptor_value, hook, with_hook, RecordingDescriptor};

fn abstract_method(name: &str) -> Value {
    Value::Method(Method::abstract_method(name))
}

fn concrete_method(name: &str) -> Value {
    Value::Method(Method::new(name, |_| Ok(Value::Int(1))))
}

fn shape(p: &Pipeline) -> TypeRef {
    p.construct(TypeDefinition::new("Shape").enforce_abstract().body(|ns| {
        ns.set("area", abstract_method("area"))?;
        ns.set("name", Value::from("shape"))
    }))
    .unwrap()
}

#[test]
fn abstract_type_refuses_instantiation() {
    let p = Pipeline::default();
    let shape = shape(&p);
    let err = shape.instantiate().unwrap_err();
    match &err {
        Error::AbstractMember { type_name, names } => {
            assert_eq!(type_name, "Shape");
            assert_eq!(names, &["area"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "can't instantiate abstract type Shape with abstract member(s): area"
    );
}

#[test]
fn overriding_subtype_instantiates() {
    let p = Pipeline::default();
    let shape = shape(&p);
    let square = p
        .construct(TypeDefinition::new("Square").base(&shape).body(|ns| ns.set("area", concrete_method("area"))))
        .unwrap();
    assert!(square.enforces_abstract());
    assert!(square.abstract_members().is_empty());
    let obj = square.instantiate().unwrap();
    assert_eq!(obj.get("name").unwrap(), Value::from("shape"));
}

#[test]
fn non_overriding_subtype_stays_abstract() {
    let p = Pipeline::default();
    let shape = shape(&p);
    let blob = p.construct(TypeDefinition::new("Blob").base(&shape)).unwrap();
    assert_eq!(blob.abstract_members(), vec!["area"]);
    assert!(matches!(blob.instantiate(), Err(Error::AbstractMember { .. })));
}

#[test]
fn definition_itself_never_fails() {
    let p = Pipeline::default();
    assert!(p
        .construct(TypeDefinition::new("A").enforce_abstract().body(|ns| ns.set("f", abstract_method("f"))))
        .is_ok());
}

#[test]
fn types_without_overlay_ignore_abstract_members() {
    let p = Pipeline::default();
    let t = p
        .construct(TypeDefinition::new("Loose").body(|ns| ns.set("f", abstract_method("f"))))
        .unwrap();
    assert!(t.instantiate().is_ok());
    assert!(t.describe().abstract_members.is_none());
}

#[test]
fn hook_can_implement_abstract_member() {
    let p = Pipeline::default();
    let base = with_hook(
        &p,
        "AutoImpl",
        &[],
        hook(|ctx, kwargs, next| {
            ctx.cls().set_attr("run", concrete_method("run"));
            next.call(kwargs)
        }),
    );
    let job = p
        .construct(
            TypeDefinition::new("Job")
                .base(&base)
                .enforce_abstract()
                .body(|ns| ns.set("run", abstract_method("run"))),
        )
        .unwrap();
    assert!(job.instantiate().is_ok());
}

#[test]
fn abstract_descriptor_counts() {
    #[derive(Debug)]
    struct AbstractProperty;
    impl Descriptor for AbstractProperty {
        fn bind_to_owner(&self, _owner: &TypeRef, _name: &str) -> classinit::Result<()> {
            Ok(())
        }
        fn is_abstract(&self) -> bool {
            true
        }
    }

    let p = Pipeline::default();
    let t = p
        .construct(
            TypeDefinition::new("Sized")
                .enforce_abstract()
                .body(|ns| ns.set("size", Value::descriptor(AbstractProperty))),
        )
        .unwrap();
    assert_eq!(t.abstract_members(), vec!["size"]);
}

#[test]
fn abstract_method_call_fails() {
    let m = Method::abstract_method("area");
    assert!(m.call(&[]).unwrap_err().is_raised("NotImplementedError"));
}

#[test]
fn overlay_still_binds_descriptors() {
    let d = RecordingDescriptor::new();
    let dd = d.clone();
    let p = Pipeline::default();
    let t = p
        .construct(TypeDefinition::new("Gated").enforce_abstract().body(move |ns| {
            ns.set("area", abstract_method("area"))?;
            ns.set("label", descriptor_value(&dd))
        }))
        .unwrap();
    assert_eq!(d.calls(), vec![("Gated".to_string(), "label".to_string())]);
    assert_eq!(t.abstract_members(), vec!["area"]);
}
