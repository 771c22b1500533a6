//! Body write order survives into type metadata.

use classinit::{Method, Pipeline, TypeDefinition, TypeRef, Value};

/// Body keys of the `AttributeOrder` type, as written.
pub const BODY_KEYS: [&str; 3] = ["a", "b", "c"];

/// Declares `AttributeOrder` with `a = 1`, a method `b`, and `c = 5`.
///
/// # Errors
///
/// Any construction error.
pub fn declare(pipeline: &Pipeline) -> classinit::Result<TypeRef> {
    pipeline.construct(TypeDefinition::new("AttributeOrder").body(|ns| {
        ns.set("a", Value::Int(1))?;
        ns.set("b", Value::Method(Method::new("b", |_| Ok(Value::None))))?;
        ns.set("c", Value::Int(5))
    }))
}
