//! Type construction driver.
//!
//! [`Pipeline::construct`] turns a [`TypeDefinition`] into a [`TypeRef`]:
//!
//! 1. linearize the declared bases;
//! 2. resolve the namespace factory (override from the `namespace` extra
//!    argument, else the first base advertising one, else the default);
//! 3. create the namespace, write `__module__` and `__qualname__`, run the body;
//! 4. record the attribute order;
//! 5. create the type object from the body snapshot;
//! 6. run the hook chain and the descriptor binder, in the configured order;
//! 7. seal the abstract-member set if the overlay is composed;
//! 8. apply class decorators.
//!
//! Any failure ends construction and is returned unchanged. The type built so
//! far is dropped; a [`Scope`] only binds the name once `construct` succeeds.

use std::fmt;

use tracing::{debug, debug_span};

use crate::abstracts::compute_abstract_members;
use crate::binder::bind_descriptors;
use crate::config::{BinderOrder, PipelineConfig};
use crate::error::Result;
use crate::factory::{resolve_factory, take_override, NAMESPACE_KWARG};
use crate::hooks::HookChain;
use crate::linearize::linearize;
use crate::namespace::{ClassNamespace, Namespace, NamespaceFactory};
use crate::order::{AttributeOrder, MODULE_MARKER, QUALNAME_MARKER};
use crate::types::{TypeObject, TypeParts, TypeRef};
use crate::value::{KwArgs, Value};

/// Module recorded when a definition does not name one.
pub const DEFAULT_MODULE: &str = "__main__";

type Body = Box<dyn FnOnce(&mut dyn ClassNamespace) -> Result<()>>;
type Decorator = Box<dyn FnOnce(TypeRef) -> Result<TypeRef>>;

/// A request to declare a new type.
///
/// Consumed by [`Pipeline::construct`].
pub struct TypeDefinition {
    name: String,
    qualname: Option<String>,
    module: String,
    bases: Vec<TypeRef>,
    kwargs: KwArgs,
    body: Option<Body>,
    enforce_abstract: bool,
    decorators: Vec<Decorator>,
}

impl TypeDefinition {
    /// A definition with no bases, no body and no extra arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualname: None,
            module: DEFAULT_MODULE.to_string(),
            bases: Vec::new(),
            kwargs: KwArgs::new(),
            body: None,
            enforce_abstract: false,
            decorators: Vec::new(),
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the declaring module.
    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Sets the qualified name; defaults to the name.
    #[must_use]
    pub fn qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }

    /// Appends a base.
    #[must_use]
    pub fn base(mut self, base: &TypeRef) -> Self {
        self.bases.push(TypeRef::clone(base));
        self
    }

    /// Appends several bases, in order.
    #[must_use]
    pub fn bases<'a>(mut self, bases: impl IntoIterator<Item = &'a TypeRef>) -> Self {
        self.bases.extend(bases.into_iter().cloned());
        self
    }

    /// Adds an extra argument for the hook chain.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name, value);
        self
    }

    /// Adds several extra arguments. A name already present, including a
    /// factory set with [`namespace_factory`](Self::namespace_factory), is
    /// replaced only if `kwargs` carries it too.
    #[must_use]
    pub fn kwargs(mut self, kwargs: KwArgs) -> Self {
        for (name, value) in kwargs.into_entries() {
            self.kwargs.insert(name, value);
        }
        self
    }

    /// Declares the namespace factory for this type and its descendants.
    #[must_use]
    pub fn namespace_factory(self, factory: NamespaceFactory) -> Self {
        self.kwarg(NAMESPACE_KWARG, Value::Factory(factory))
    }

    /// Sets the body, run once against the fresh namespace.
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: FnOnce(&mut dyn ClassNamespace) -> Result<()> + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Composes the abstract-enforcement overlay.
    #[must_use]
    pub fn enforce_abstract(mut self) -> Self {
        self.enforce_abstract = true;
        self
    }

    /// Registers a class decorator. Decorators run in registration order,
    /// after the rest of the pipeline.
    #[must_use]
    pub fn decorator<F>(mut self, decorator: F) -> Self
    where
        F: FnOnce(TypeRef) -> Result<TypeRef> + 'static,
    {
        self.decorators.push(Box::new(decorator));
        self
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("module", &self.module)
            .field(
                "bases",
                &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .field("kwargs", &self.kwargs.names())
            .field("has_body", &self.body.is_some())
            .field("enforce_abstract", &self.enforce_abstract)
            .field("decorators", &self.decorators.len())
            .finish()
    }
}

/// The type construction driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// A driver with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Constructs a type.
    ///
    /// # Errors
    ///
    /// Linearization and argument errors, plus anything returned by the
    /// body, a hook, a `bind_to_owner` call or a decorator, unchanged.
    pub fn construct(&self, definition: TypeDefinition) -> Result<TypeRef> {
        let TypeDefinition {
            name,
            qualname,
            module,
            bases,
            mut kwargs,
            body,
            enforce_abstract,
            decorators,
        } = definition;
        let span = debug_span!("construct_type", name = %name);
        let _guard = span.enter();

        let ancestors = linearize(&bases)?;
        let factory = resolve_factory(&bases, take_override(&mut kwargs)?);

        let mut namespace = factory.body.create();
        namespace.set(MODULE_MARKER, Value::Str(module.clone()))?;
        let qualname = qualname.unwrap_or_else(|| name.clone());
        namespace.set(QUALNAME_MARKER, Value::Str(qualname.clone()))?;
        if let Some(body) = body {
            body(&mut *namespace)?;
        }

        let attribute_order = AttributeOrder::record(&*namespace);
        let snapshot = Namespace::from_entries(namespace.entries());
        drop(namespace);

        let enforces_abstract = enforce_abstract || bases.iter().any(|b| b.enforces_abstract());
        let cls = TypeObject::create(TypeParts {
            name,
            qualname,
            module,
            bases,
            ancestors,
            attribute_order,
            namespace_factory: factory.advertised,
            enforces_abstract,
            members: snapshot.clone(),
        });

        let chain = HookChain::resolve(&cls)?;
        debug!(links = chain.len(), kwargs = ?kwargs.names(), "resolved hook chain");
        match self.config.binder_order {
            BinderOrder::AfterHooks => {
                chain.invoke(&cls, &snapshot, kwargs, self.config.root_policy)?;
                bind_descriptors(&cls)?;
            }
            BinderOrder::BeforeHooks => {
                bind_descriptors(&cls)?;
                chain.invoke(&cls, &snapshot, kwargs, self.config.root_policy)?;
            }
        }

        if cls.enforces_abstract() {
            let missing = compute_abstract_members(&cls);
            debug!(missing = ?missing, "sealed abstract members");
            cls.seal_abstract_members(missing);
        }

        let mut cls = cls;
        for decorate in decorators {
            cls = decorate(cls)?;
        }
        Ok(cls)
    }
}

/// A caller's binding environment.
///
/// Declaring a type through a scope binds its name only once construction
/// has fully succeeded; a failed declaration leaves whatever was bound
/// before (or nothing) in place.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: Namespace,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a type and binds it under its declared name.
    ///
    /// # Errors
    ///
    /// Any construction error; the scope is unchanged in that case.
    pub fn declare(&mut self, pipeline: &Pipeline, definition: TypeDefinition) -> Result<TypeRef> {
        let name = definition.name().to_string();
        let cls = pipeline.construct(definition)?;
        self.bindings.insert(name, Value::Type(TypeRef::clone(&cls)));
        Ok(cls)
    }

    /// Binds an arbitrary value.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name, value.into());
    }

    /// The value bound under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get_ref(name)
    }

    /// The type bound under `name`, if a type is bound there.
    pub fn get_type(&self, name: &str) -> Option<&TypeRef> {
        self.get(name).and_then(Value::as_type)
    }

    /// Bound names, in binding order.
    pub fn names(&self) -> Vec<&str> {
        self.bindings.keys()
    }
}
