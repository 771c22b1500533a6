//! Attribute order recorder.
//!
//! The order is taken once from the body namespace, right before the type
//! object is created, and never recomputed. Keys appear exactly as the
//! namespace reports them, host-injected markers included.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::namespace::ClassNamespace;

/// Marker the driver writes before the body runs: the declaring module.
pub const MODULE_MARKER: &str = "__module__";

/// Marker the driver writes before the body runs: the qualified name.
pub const QUALNAME_MARKER: &str = "__qualname__";

/// Immutable ordered sequence of member names, in first-write order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeOrder(Arc<[String]>);

impl AttributeOrder {
    /// Records the key order of a namespace snapshot.
    pub fn record(namespace: &dyn ClassNamespace) -> Self {
        Self::from_keys(namespace.entries().into_iter().map(|(k, _)| k))
    }

    /// Builds an order from already-unique keys.
    pub fn from_keys(keys: impl IntoIterator<Item = String>) -> Self {
        Self(keys.into_iter().collect())
    }

    /// The names as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of recorded names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the body wrote nothing and no marker was injected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of a name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }

    /// Whether a name was recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Names written by the body itself, markers skipped.
    pub fn body_keys(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|k| *k != MODULE_MARKER && *k != QUALNAME_MARKER)
    }
}

impl PartialEq<[&str]> for AttributeOrder {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for AttributeOrder {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}

impl Serialize for AttributeOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}
