//! A base type that records every subtype derived from it.

use std::sync::{Arc, Weak};

use classinit::{Pipeline, SubclassHook, TypeDefinition, TypeObject, TypeRef, Value, INIT_SUBCLASS};
use parking_lot::Mutex;

/// The registry root and its shared list of subtypes.
///
/// Entries are held weakly; a subtype nobody else holds drops out.
#[derive(Debug)]
pub struct Registry {
    root: TypeRef,
    entries: Arc<Mutex<Vec<Weak<TypeObject>>>>,
}

impl Registry {
    /// Declares the `Registry` root type.
    ///
    /// # Errors
    ///
    /// Any construction error.
    pub fn declare(pipeline: &Pipeline) -> classinit::Result<Self> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&entries);
        let hook = SubclassHook::new(move |ctx, kwargs, next| {
            next.call(kwargs)?;
            sink.lock().push(Arc::downgrade(ctx.cls()));
            Ok(())
        });
        let root = pipeline.construct(
            TypeDefinition::new("Registry")
                .body(move |ns| ns.set(INIT_SUBCLASS, Value::Hook(hook))),
        )?;
        Ok(Self { root, entries })
    }

    /// The root type.
    pub fn root(&self) -> &TypeRef {
        &self.root
    }

    /// Declares an empty subtype of the root.
    ///
    /// # Errors
    ///
    /// Any construction error.
    pub fn register(&self, pipeline: &Pipeline, name: &str) -> classinit::Result<TypeRef> {
        pipeline.construct(TypeDefinition::new(name).base(&self.root))
    }

    /// Live subtypes, in registration order.
    pub fn subclasses(&self) -> Vec<TypeRef> {
        self.entries.lock().iter().filter_map(Weak::upgrade).collect()
    }

    /// Names of the live subtypes.
    pub fn names(&self) -> Vec<String> {
        self.subclasses()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }
}
