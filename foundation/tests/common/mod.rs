//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use classinit::{
    ClassNamespace, Descriptor, Error, HookContext, KwArgs, Namespace, Next, Pipeline, Result,
    SubclassHook, TypeDefinition, TypeRef, Value, INIT_SUBCLASS,
};

/// Declares a type whose body only stores `hook` under `__init_subclass__`.
pub fn with_hook(pipeline: &Pipeline, name: &str, bases: &[TypeRef], hook: SubclassHook) -> TypeRef {
    pipeline
        .construct(
            TypeDefinition::new(name)
                .bases(bases)
                .body(move |ns| ns.set(INIT_SUBCLASS, Value::Hook(hook))),
        )
        .unwrap()
}

/// A hook built from a closure, for brevity at call sites.
pub fn hook<F>(f: F) -> SubclassHook
where
    F: Fn(&HookContext<'_>, KwArgs, Next<'_>) -> Result<()> + Send + Sync + 'static,
{
    SubclassHook::new(f)
}

/// A hook that sets `name = value` on the subtype and delegates.
pub fn setter(name: &'static str, value: i64) -> SubclassHook {
    SubclassHook::new(move |ctx, kwargs, next| {
        ctx.cls().set_attr(name, value);
        next.call(kwargs)
    })
}

/// A hook that sets `name = value` on the subtype and ends the chain.
pub fn setter_only(name: &'static str, value: i64) -> SubclassHook {
    SubclassHook::new(move |ctx, _kwargs, _next| {
        ctx.cls().set_attr(name, value);
        Ok(())
    })
}

/// Integer stored under `name` along the MRO of `cls`, if any.
pub fn int_attr(cls: &TypeRef, name: &str) -> Option<i64> {
    cls.lookup(name).and_then(|v| v.as_int())
}

/// Records every `bind_to_owner` call it receives.
#[derive(Debug, Default)]
pub struct RecordingDescriptor {
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail_with: Option<&'static str>,
}

impl RecordingDescriptor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(kind: &'static str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(kind),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Descriptor for RecordingDescriptor {
    fn bind_to_owner(&self, owner: &TypeRef, name: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((owner.name().to_string(), name.to_string()));
        match self.fail_with {
            Some(kind) => Err(Error::raised(kind, name)),
            None => Ok(()),
        }
    }
}

/// Stores a shared descriptor as a member value.
pub fn descriptor_value(d: &Arc<RecordingDescriptor>) -> Value {
    Value::Descriptor(Arc::clone(d) as Arc<dyn Descriptor>)
}

/// A namespace that journals every write into a shared log.
#[derive(Debug)]
pub struct JournalingNamespace {
    inner: Namespace,
    journal: Arc<Mutex<Vec<String>>>,
}

impl JournalingNamespace {
    pub fn new(journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            inner: Namespace::new(),
            journal,
        }
    }
}

impl ClassNamespace for JournalingNamespace {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.journal.lock().unwrap().push(key.to_string());
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.inner.get(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    fn len(&self) -> usize {
        ClassNamespace::len(&self.inner)
    }

    fn entries(&self) -> Vec<(String, Value)> {
        self.inner.entries()
    }
}
