//! Ordered namespaces: the capture buffer a type body writes into.
//!
//! The pipeline only talks to the [`ClassNamespace`] trait, so a custom
//! namespace (validating, journaling, ...) slots in wherever the default
//! [`Namespace`] would, provided it keeps first-write order and reports
//! absent keys as [`Error::Lookup`].
//!
//! # Examples
//!
//! ```
//! use classinit::{ClassNamespace, Namespace, Value};
//!
//! let mut ns = Namespace::new();
//! ns.set("a", Value::Int(1)).unwrap();
//! ns.set("b", Value::Int(2)).unwrap();
//! ns.set("a", Value::Int(3)).unwrap();
//! assert_eq!(ns.keys(), vec!["a", "b"]);
//! assert_eq!(ns.get("a").unwrap(), Value::Int(3));
//! assert!(ns.get("c").is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::Value;

/// Mutable ordered mapping used while a type body is evaluated.
pub trait ClassNamespace: Send {
    /// Writes a key. A new key goes to the end; an existing key keeps its position.
    ///
    /// # Errors
    ///
    /// Custom namespaces may reject a write; the default never does.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Reads a key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lookup`] when the key was never written.
    fn get(&self, key: &str) -> Result<Value>;

    /// Whether the key was written.
    fn contains(&self, key: &str) -> bool;

    /// Number of distinct keys.
    fn len(&self) -> usize;

    /// True when no key was written.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries in first-write order.
    fn entries(&self) -> Vec<(String, Value)>;
}

/// The default ordered namespace.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Namespace {
    /// An empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a namespace from entries, keeping the first position of any repeated key.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut ns = Self::new();
        for (k, v) in entries {
            ns.insert(k, v);
        }
        ns
    }

    /// Inserts or overwrites in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Borrows a value.
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Keys in first-write order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Iterates entries in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl ClassNamespace for Namespace {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.get_ref(key).cloned().ok_or_else(|| Error::Lookup {
            key: key.to_string(),
        })
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn entries(&self) -> Vec<(String, Value)> {
        self.entries.clone()
    }
}

type MakeNamespace = dyn Fn() -> Box<dyn ClassNamespace> + Send + Sync;

/// Produces a fresh namespace for each type body.
///
/// A type can advertise one to its descendants; see
/// [`resolve_factory`](crate::factory::resolve_factory).
#[derive(Clone)]
pub struct NamespaceFactory {
    name: String,
    make: Arc<MakeNamespace>,
}

impl NamespaceFactory {
    /// A named factory.
    pub fn new<F>(name: impl Into<String>, make: F) -> Self
    where
        F: Fn() -> Box<dyn ClassNamespace> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            make: Arc::new(make),
        }
    }

    /// The default factory producing [`Namespace`].
    pub fn ordered() -> Self {
        Self::new("ordered", || Box::new(Namespace::new()))
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a fresh namespace.
    pub fn create(&self) -> Box<dyn ClassNamespace> {
        (self.make)()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.make, &other.make)
    }
}

impl fmt::Debug for NamespaceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamespaceFactory").field(&self.name).finish()
    }
}
