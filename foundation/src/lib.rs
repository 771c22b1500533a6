//! Type-construction pipeline.
//!
//! `classinit` builds composite types the way a class statement does, and
//! lets user code hook into the process:
//!
//! - a type body writes into an ordered namespace ([`ClassNamespace`]), which a
//!   base type can swap for its own ([`NamespaceFactory`]);
//! - the write order is kept as [`AttributeOrder`] metadata;
//! - every ancestor may declare a subclass-init hook ([`SubclassHook`]) that
//!   runs when a subtype is derived, cooperating with the next ancestor
//!   through an explicit [`Next`] continuation;
//! - members implementing [`Descriptor`] learn the type and name they were
//!   declared under;
//! - the abstract-enforcement overlay refuses to instantiate types with
//!   unimplemented abstract members.
//!
//! # Entry Point
//!
//! ```
//! use classinit::{Method, Pipeline, Scope, SubclassHook, TypeDefinition, Value, INIT_SUBCLASS};
//!
//! let pipeline = Pipeline::default();
//! let mut scope = Scope::new();
//!
//! let base = scope
//!     .declare(
//!         &pipeline,
//!         TypeDefinition::new("Base").body(|ns| {
//!             ns.set(
//!                 INIT_SUBCLASS,
//!                 Value::Hook(SubclassHook::new(|ctx, kwargs, next| {
//!                     ctx.cls().set_attr("x", 0);
//!                     next.call(kwargs)
//!                 })),
//!             )
//!         }),
//!     )
//!     .unwrap();
//!
//! let sub = scope
//!     .declare(
//!         &pipeline,
//!         TypeDefinition::new("Sub").base(&base).body(|ns| {
//!             ns.set("a", Value::Int(1))?;
//!             ns.set("b", Value::Method(Method::new("b", |_| Ok(Value::None))))
//!         }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(sub.get_own("x"), Some(Value::Int(0)));
//! assert_eq!(
//!     sub.attribute_order().as_slice(),
//!     ["__module__", "__qualname__", "a", "b"]
//! );
//! assert!(scope.get_type("Sub").is_some());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod abstracts;
pub mod binder;
pub mod config;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod linearize;
pub mod namespace;
pub mod order;
pub mod pipeline;
pub mod types;
pub mod value;

pub use abstracts::compute_abstract_members;
pub use binder::bind_descriptors;
pub use config::{BinderOrder, PipelineConfig};
pub use error::{Error, Result};
pub use factory::{resolve_factory, FactoryResolution, NAMESPACE_KWARG};
pub use hooks::{HookChain, HookContext, HookLink, Next, RootPolicy, SubclassHook, INIT_SUBCLASS};
pub use linearize::linearize;
pub use namespace::{ClassNamespace, Namespace, NamespaceFactory};
pub use order::{AttributeOrder, MODULE_MARKER, QUALNAME_MARKER};
pub use pipeline::{Pipeline, Scope, TypeDefinition, DEFAULT_MODULE};
pub use types::{Instance, TypeDescription, TypeObject, TypeRef};
pub use value::{Descriptor, KwArgs, Method, Value};
