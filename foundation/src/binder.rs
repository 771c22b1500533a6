//! Descriptor binder: tells bind-aware own members their owner and name.

use tracing::{debug, trace};

use crate::error::Result;
use crate::types::TypeRef;
use crate::value::Value;

/// Calls [`bind_to_owner`](crate::Descriptor::bind_to_owner) once for every
/// body-declared member of `cls` that is currently a descriptor, in
/// attribute order.
///
/// Each name is read from the type's own members at bind time, so a member a
/// hook replaced with a non-descriptor is skipped, and one a hook replaced
/// with another descriptor binds the replacement. Inherited members and
/// members that never appeared in the body are not visited. The first
/// failing bind stops the pass and its error is returned unchanged.
///
/// # Errors
///
/// The first error returned by a `bind_to_owner` call.
pub fn bind_descriptors(cls: &TypeRef) -> Result<usize> {
    let mut bound = 0;
    for name in cls.attribute_order().iter() {
        let Some(Value::Descriptor(descriptor)) = cls.get_own(name) else {
            continue;
        };
        trace!(owner = cls.name(), member = name, "binding descriptor");
        if let Err(err) = descriptor.bind_to_owner(cls, name) {
            debug!(owner = cls.name(), member = name, error = %err, "descriptor bind failed");
            return Err(err);
        }
        bound += 1;
    }
    debug!(owner = cls.name(), bound, "descriptor binding complete");
    Ok(bound)
}
