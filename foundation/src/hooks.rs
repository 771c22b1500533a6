//! Hook chain resolver.
//!
//! Every ancestor of a new type may declare a subclass-init hook by storing
//! a [`SubclassHook`] under [`INIT_SUBCLASS`] in its body. When a subtype is
//! constructed, the hooks of its ancestors (the subtype's own hook is not
//! among them; it fires for *its* subtypes) form an explicit chain in
//! linearized order. Only the first link is invoked by the pipeline. Each
//! link receives a [`Next`] and decides whether to delegate: calling
//! [`Next::call`] continues the chain with the forwarded arguments, dropping
//! it ends the chain right there.
//!
//! # Examples
//!
//! ```
//! use classinit::{Pipeline, SubclassHook, TypeDefinition, Value, INIT_SUBCLASS};
//!
//! let pipeline = Pipeline::default();
//! let base = pipeline
//!     .construct(TypeDefinition::new("Base").body(|ns| {
//!         ns.set(
//!             INIT_SUBCLASS,
//!             Value::Hook(SubclassHook::new(|ctx, mut kwargs, next| {
//!                 let tag = kwargs.take("tag").unwrap_or(Value::None);
//!                 ctx.cls().set_attr("tag", tag);
//!                 next.call(kwargs)
//!             })),
//!         )
//!     }))
//!     .unwrap();
//! let sub = pipeline
//!     .construct(TypeDefinition::new("Sub").base(&base).kwarg("tag", "blue"))
//!     .unwrap();
//! assert_eq!(sub.get_own("tag"), Some(Value::from("blue")));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::types::TypeRef;
use crate::value::{KwArgs, Value};

/// Own-member key under which a type declares its subclass-init hook.
pub const INIT_SUBCLASS: &str = "__init_subclass__";

type HookFn = dyn Fn(&HookContext<'_>, KwArgs, Next<'_>) -> Result<()> + Send + Sync;

/// A subclass-init hook.
///
/// The hook is always bound to the subtype under construction, available as
/// [`HookContext::cls`]; declaring code does not mark it in any way.
#[derive(Clone)]
pub struct SubclassHook(Arc<HookFn>);

impl SubclassHook {
    /// Wraps a hook body.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HookContext<'_>, KwArgs, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A hook that only delegates, forwarding every argument.
    pub fn delegating() -> Self {
        Self::new(|_, kwargs, next| next.call(kwargs))
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SubclassHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubclassHook")
    }
}

/// What the chain does with arguments nobody consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Leftover arguments fail with [`Error::ChainDelegation`].
    #[default]
    Strict,
    /// Leftover arguments are dropped.
    Permissive,
}

/// Read-only view handed to every hook link.
#[derive(Debug)]
pub struct HookContext<'a> {
    cls: &'a TypeRef,
    owner: &'a TypeRef,
    namespace: &'a Namespace,
}

impl<'a> HookContext<'a> {
    /// The subtype being constructed.
    pub fn cls(&self) -> &'a TypeRef {
        self.cls
    }

    /// The ancestor that declared the running hook.
    pub fn owner(&self) -> &'a TypeRef {
        self.owner
    }

    /// The subtype's body namespace as it was when evaluation finished.
    pub fn namespace(&self) -> &'a Namespace {
        self.namespace
    }
}

/// One entry of a resolved chain.
#[derive(Clone, Debug)]
pub struct HookLink {
    /// Type that declared the hook.
    pub owner: TypeRef,
    /// The hook itself.
    pub hook: SubclassHook,
}

/// The hooks of a type's ancestry, in linearized order.
#[derive(Clone, Debug, Default)]
pub struct HookChain {
    links: Vec<HookLink>,
}

impl HookChain {
    /// Collects the hooks declared by the ancestors of `cls`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHook`] when an ancestor stores a non-hook
    /// value under [`INIT_SUBCLASS`].
    pub fn resolve(cls: &TypeRef) -> Result<Self> {
        let mut links = Vec::new();
        for ancestor in cls.ancestors() {
            match ancestor.get_own(INIT_SUBCLASS) {
                None => {}
                Some(Value::Hook(hook)) => links.push(HookLink {
                    owner: Arc::clone(ancestor),
                    hook,
                }),
                Some(_) => {
                    return Err(Error::InvalidHook {
                        owner: ancestor.name().to_string(),
                    })
                }
            }
        }
        Ok(Self { links })
    }

    /// The links.
    pub fn links(&self) -> &[HookLink] {
        &self.links
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when no ancestor declares a hook.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Invokes the first link; the root policy applies if the chain is empty.
    ///
    /// # Errors
    ///
    /// Whatever a hook returns, or [`Error::ChainDelegation`] under the
    /// strict policy.
    pub fn invoke(
        &self,
        cls: &TypeRef,
        namespace: &Namespace,
        kwargs: KwArgs,
        policy: RootPolicy,
    ) -> Result<()> {
        Next {
            rest: &self.links,
            cls,
            namespace,
            policy,
        }
        .call(kwargs)
    }
}

/// Continuation to the remainder of the chain.
///
/// Consumed by [`call`](Next::call), so a hook delegates at most once.
pub struct Next<'a> {
    rest: &'a [HookLink],
    cls: &'a TypeRef,
    namespace: &'a Namespace,
    policy: RootPolicy,
}

impl Next<'_> {
    /// Hands `kwargs` to the next hook in the chain, or to the root policy.
    ///
    /// # Errors
    ///
    /// Whatever the next hook returns, or [`Error::ChainDelegation`] when
    /// arguments reach a strict root unconsumed.
    pub fn call(self, kwargs: KwArgs) -> Result<()> {
        let Some((link, rest)) = self.rest.split_first() else {
            return self.finish(kwargs);
        };
        trace!(
            cls = self.cls.name(),
            owner = link.owner.name(),
            remaining = rest.len(),
            "invoking subclass hook"
        );
        let ctx = HookContext {
            cls: self.cls,
            owner: &link.owner,
            namespace: self.namespace,
        };
        let next = Next {
            rest,
            cls: self.cls,
            namespace: self.namespace,
            policy: self.policy,
        };
        (link.hook.0)(&ctx, kwargs, next)
    }

    /// Whether any hook remains after this point.
    pub fn is_last(&self) -> bool {
        self.rest.is_empty()
    }

    fn finish(self, kwargs: KwArgs) -> Result<()> {
        if kwargs.is_empty() || self.policy == RootPolicy::Permissive {
            return Ok(());
        }
        Err(Error::ChainDelegation {
            type_name: self.cls.name().to_string(),
            names: kwargs.names(),
        })
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rest.len())
            .field("policy", &self.policy)
            .finish()
    }
}
