//! Type objects and their instances.
//!
//! A [`TypeObject`] is created by the [`Pipeline`](crate::Pipeline) and
//! shared as a [`TypeRef`]. Its name, ancestry, attribute order and
//! advertised namespace factory are fixed at creation; its own members stay
//! writable so subclass-init hooks can populate the new type (and, through
//! [`HookContext::owner`](crate::HookContext::owner), their declaring type).

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::namespace::{Namespace, NamespaceFactory};
use crate::order::AttributeOrder;
use crate::value::Value;

/// Shared handle to a type object.
pub type TypeRef = Arc<TypeObject>;

/// A constructed type.
pub struct TypeObject {
    name: String,
    qualname: String,
    module: String,
    bases: Vec<TypeRef>,
    ancestors: Vec<TypeRef>,
    attribute_order: AttributeOrder,
    namespace_factory: Option<NamespaceFactory>,
    enforces_abstract: bool,
    abstract_members: OnceLock<BTreeSet<String>>,
    members: RwLock<Namespace>,
}

/// Creation-time fields of a type; everything the driver has decided before
/// hooks run.
pub(crate) struct TypeParts {
    pub name: String,
    pub qualname: String,
    pub module: String,
    pub bases: Vec<TypeRef>,
    pub ancestors: Vec<TypeRef>,
    pub attribute_order: AttributeOrder,
    pub namespace_factory: Option<NamespaceFactory>,
    pub enforces_abstract: bool,
    pub members: Namespace,
}

impl TypeObject {
    pub(crate) fn create(parts: TypeParts) -> TypeRef {
        Arc::new(Self {
            name: parts.name,
            qualname: parts.qualname,
            module: parts.module,
            bases: parts.bases,
            ancestors: parts.ancestors,
            attribute_order: parts.attribute_order,
            namespace_factory: parts.namespace_factory,
            enforces_abstract: parts.enforces_abstract,
            abstract_members: OnceLock::new(),
            members: RwLock::new(parts.members),
        })
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Declaring module.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Declared bases, in declaration order.
    pub fn bases(&self) -> &[TypeRef] {
        &self.bases
    }

    /// Linearized ancestry, the type itself excluded.
    pub fn ancestors(&self) -> &[TypeRef] {
        &self.ancestors
    }

    /// Method resolution order: the type itself followed by its ancestors.
    pub fn mro(self: &Arc<Self>) -> Vec<TypeRef> {
        std::iter::once(Arc::clone(self))
            .chain(self.ancestors.iter().cloned())
            .collect()
    }

    /// Order in which the body wrote its members.
    pub fn attribute_order(&self) -> &AttributeOrder {
        &self.attribute_order
    }

    /// Factory this type hands to its descendants, if any.
    pub fn namespace_factory(&self) -> Option<&NamespaceFactory> {
        self.namespace_factory.as_ref()
    }

    /// Whether instantiation is gated on abstract members.
    pub fn enforces_abstract(&self) -> bool {
        self.enforces_abstract
    }

    /// Unimplemented abstract members; empty for types without the overlay.
    pub fn abstract_members(&self) -> Vec<String> {
        self.abstract_members
            .get()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn seal_abstract_members(&self, names: BTreeSet<String>) {
        // Only the driver seals, once per construction.
        let _ = self.abstract_members.set(names);
    }

    /// An own member.
    pub fn get_own(&self, name: &str) -> Option<Value> {
        self.members.read().get_ref(name).cloned()
    }

    /// Whether `name` is an own member.
    pub fn has_own(&self, name: &str) -> bool {
        self.members.read().get_ref(name).is_some()
    }

    /// Own member names, in insertion order (body members first, then
    /// anything added by hooks).
    pub fn own_member_names(&self) -> Vec<String> {
        self.members
            .read()
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Looks a member up along the method resolution order.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.get_own(name)
            .or_else(|| self.ancestors.iter().find_map(|t| t.get_own(name)))
    }

    /// Like [`lookup`](TypeObject::lookup), failing when nothing defines `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attribute`] when no type in the MRO defines `name`.
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        self.lookup(name).ok_or_else(|| Error::Attribute {
            owner: format!("type {}", self.name),
            name: name.to_string(),
        })
    }

    /// Writes an own member. The attribute order is not affected.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.members.write().insert(name, value.into());
    }

    /// Whether `other` appears in this type's MRO.
    pub fn is_subtype_of(&self, other: &TypeObject) -> bool {
        std::ptr::eq(self, other) || self.ancestors.iter().any(|a| std::ptr::eq(&**a, other))
    }

    /// Creates an instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AbstractMember`] when abstract members remain; no
    /// instance is created in that case.
    pub fn instantiate(self: &Arc<Self>) -> Result<Instance> {
        let missing = self.abstract_members();
        if !missing.is_empty() {
            debug!(type_name = %self.name, missing = ?missing, "refusing to instantiate abstract type");
            return Err(Error::AbstractMember {
                type_name: self.name.clone(),
                names: missing,
            });
        }
        Ok(Instance {
            type_: Arc::clone(self),
            attrs: Namespace::new(),
        })
    }

    /// Metadata snapshot.
    pub fn describe(self: &Arc<Self>) -> TypeDescription {
        TypeDescription {
            name: self.name.clone(),
            qualname: self.qualname.clone(),
            module: self.module.clone(),
            bases: self.bases.iter().map(|b| b.name.clone()).collect(),
            mro: self.mro().iter().map(|t| t.name.clone()).collect(),
            attribute_order: self.attribute_order.clone(),
            own_members: self.own_member_names(),
            namespace_factory: self.namespace_factory.as_ref().map(|f| f.name().to_string()),
            abstract_members: self.enforces_abstract.then(|| self.abstract_members()),
        }
    }
}

impl fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeObject")
            .field("name", &self.name)
            .field("module", &self.module)
            .field(
                "bases",
                &self.bases.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            )
            .field("attribute_order", &self.attribute_order)
            .finish_non_exhaustive()
    }
}

/// Serializable metadata of a constructed type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeDescription {
    /// Declared name.
    pub name: String,
    /// Qualified name.
    pub qualname: String,
    /// Declaring module.
    pub module: String,
    /// Names of the declared bases.
    pub bases: Vec<String>,
    /// Names along the method resolution order, the type itself first.
    pub mro: Vec<String>,
    /// Body write order.
    pub attribute_order: AttributeOrder,
    /// Current own members.
    pub own_members: Vec<String>,
    /// Name of the advertised namespace factory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_factory: Option<String>,
    /// Unimplemented abstract members; absent when the overlay is not composed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_members: Option<Vec<String>>,
}

/// An instance of a concrete type.
#[derive(Debug)]
pub struct Instance {
    type_: TypeRef,
    attrs: Namespace,
}

impl Instance {
    /// The instantiated type.
    pub fn type_(&self) -> &TypeRef {
        &self.type_
    }

    /// Instance attribute, falling back to the type's MRO.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attribute`] when neither the instance nor its type
    /// defines `name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(v) = self.attrs.get_ref(name) {
            return Ok(v.clone());
        }
        self.type_.lookup(name).ok_or_else(|| Error::Attribute {
            owner: format!("{} instance", self.type_.name()),
            name: name.to_string(),
        })
    }

    /// Sets an instance attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name, value.into());
    }
}
