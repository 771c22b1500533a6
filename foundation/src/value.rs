//! Member values, methods, the bind capability, and extra arguments.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hooks::SubclassHook;
use crate::namespace::NamespaceFactory;
use crate::types::TypeRef;

/// A value stored in a namespace, a type's own members, an instance, or a
/// caller's scope.
///
/// Data variants compare structurally; types, methods, hooks, descriptors
/// and factories compare by identity.
#[derive(Clone, Debug)]
pub enum Value {
    /// The absent value.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list.
    List(Vec<Value>),
    /// A type object.
    Type(TypeRef),
    /// A method.
    Method(Method),
    /// A subclass-init hook.
    Hook(SubclassHook),
    /// A member implementing the bind capability.
    Descriptor(Arc<dyn Descriptor>),
    /// A namespace factory.
    Factory(NamespaceFactory),
}

impl Value {
    /// Wraps a descriptor.
    pub fn descriptor<D: Descriptor + 'static>(descriptor: D) -> Self {
        Self::Descriptor(Arc::new(descriptor))
    }

    /// Returns the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the type payload, if any.
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Type(t) => Some(t),
            _ => None,
        }
    }

    /// True for abstract methods and abstract descriptors.
    pub fn is_abstract(&self) -> bool {
        match self {
            Self::Method(m) => m.is_abstract(),
            Self::Descriptor(d) => d.is_abstract(),
            _ => false,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Type(_) => "type",
            Self::Method(_) => "method",
            Self::Hook(_) => "hook",
            Self::Descriptor(_) => "descriptor",
            Self::Factory(_) => "factory",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => Arc::ptr_eq(a, b),
            (Self::Method(a), Self::Method(b)) => Arc::ptr_eq(&a.body, &b.body),
            (Self::Hook(a), Self::Hook(b)) => a.ptr_eq(b),
            (Self::Descriptor(a), Self::Descriptor(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Self::Factory(a), Self::Factory(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<TypeRef> for Value {
    fn from(v: TypeRef) -> Self {
        Self::Type(v)
    }
}

impl From<Method> for Value {
    fn from(v: Method) -> Self {
        Self::Method(v)
    }
}

impl From<SubclassHook> for Value {
    fn from(v: SubclassHook) -> Self {
        Self::Hook(v)
    }
}

impl From<NamespaceFactory> for Value {
    fn from(v: NamespaceFactory) -> Self {
        Self::Factory(v)
    }
}

type MethodBody = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A callable member.
#[derive(Clone)]
pub struct Method {
    name: String,
    is_abstract: bool,
    body: Arc<MethodBody>,
}

impl Method {
    /// A concrete method.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_abstract: false,
            body: Arc::new(body),
        }
    }

    /// An abstract method. Calling it fails with `NotImplementedError`.
    pub fn abstract_method(name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("{name} is abstract");
        Self {
            name,
            is_abstract: true,
            body: Arc::new(move |_: &[Value]| -> Result<Value> {
                Err(Error::raised("NotImplementedError", message.clone()))
            }),
        }
    }

    /// Method name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the method is flagged abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Invokes the method body.
    ///
    /// # Errors
    ///
    /// Whatever the body returns.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.body)(args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

/// The bind capability: a member that wants to learn the type and name it
/// was declared under.
///
/// Implementors need no common base; storing one as [`Value::Descriptor`] in
/// a type body is enough for the descriptor binder to call
/// [`bind_to_owner`](Descriptor::bind_to_owner) once after construction.
pub trait Descriptor: Send + Sync + fmt::Debug {
    /// Called once per declaring type with the owning type and member name.
    ///
    /// # Errors
    ///
    /// Any error aborts construction of `owner` and reaches the caller unchanged.
    fn bind_to_owner(&self, owner: &TypeRef, name: &str) -> Result<()>;

    /// Whether this member counts as an unimplemented abstract member.
    fn is_abstract(&self) -> bool {
        false
    }
}

/// Named extra arguments supplied at a declaration site.
///
/// Hooks [`take`](KwArgs::take) the names they understand and forward the
/// rest to the next link of the chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KwArgs {
    entries: Vec<(String, Value)>,
}

impl KwArgs {
    /// An empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an argument, keeping its position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`insert`](KwArgs::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Removes and returns an argument.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Reads an argument without consuming it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Remaining argument names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of remaining arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when every argument has been consumed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the set, yielding its entries in declaration order.
    pub fn into_entries(self) -> impl Iterator<Item = (String, Value)> {
        self.entries.into_iter()
    }
}
