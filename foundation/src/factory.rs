//! Namespace-factory propagation.
//!
//! A type may advertise a [`NamespaceFactory`]; every descendant declared
//! through it evaluates its body in a namespace from that factory, and keeps
//! advertising it, until some descendant declares a different one.

use tracing::debug;

use crate::error::{Error, Result};
use crate::namespace::NamespaceFactory;
use crate::types::TypeRef;
use crate::value::{KwArgs, Value};

/// Extra-argument key carrying a namespace-factory override.
pub const NAMESPACE_KWARG: &str = "namespace";

/// Outcome of factory resolution for one type-definition request.
#[derive(Clone, Debug)]
pub struct FactoryResolution {
    /// Factory the body is evaluated with.
    pub body: NamespaceFactory,
    /// Factory the new type advertises to its descendants.
    pub advertised: Option<NamespaceFactory>,
}

/// Resolves the factory for a new type.
///
/// The override wins. Otherwise the declared bases are checked in
/// declaration order and the first one advertising a factory supplies it.
/// With neither, the body gets the default ordered namespace and the new
/// type advertises nothing.
pub fn resolve_factory(
    bases: &[TypeRef],
    override_factory: Option<NamespaceFactory>,
) -> FactoryResolution {
    let advertised = override_factory.or_else(|| {
        bases
            .iter()
            .find_map(|b| b.namespace_factory().cloned())
    });
    let body = advertised.clone().unwrap_or_else(NamespaceFactory::ordered);
    debug!(factory = body.name(), inherited = advertised.is_some(), "resolved namespace factory");
    FactoryResolution { body, advertised }
}

/// Removes the factory override from the extra arguments, if present.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when the `namespace` argument holds
/// anything but a factory.
pub fn take_override(kwargs: &mut KwArgs) -> Result<Option<NamespaceFactory>> {
    match kwargs.take(NAMESPACE_KWARG) {
        None | Some(Value::None) => Ok(None),
        Some(Value::Factory(f)) => Ok(Some(f)),
        Some(_) => Err(Error::InvalidArgument {
            name: NAMESPACE_KWARG.to_string(),
            expected: "a namespace factory",
        }),
    }
}
