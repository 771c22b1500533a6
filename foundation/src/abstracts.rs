//! Abstract-enforcement overlay.
//!
//! Composed into a type by [`TypeDefinition::enforce_abstract`] or inherited
//! from any enforcing base. Type definition never fails because of abstract
//! members; the overlay only records which ones remain so that
//! [`TypeObject::instantiate`] can refuse.
//!
//! [`TypeDefinition::enforce_abstract`]: crate::TypeDefinition::enforce_abstract
//! [`TypeObject::instantiate`]: crate::TypeObject::instantiate

use std::collections::BTreeSet;

use crate::types::TypeRef;

/// Names visible through the MRO of `cls` whose resolved value is abstract.
///
/// A name declared abstract by an ancestor drops out as soon as any type
/// earlier in the MRO defines it concretely.
pub fn compute_abstract_members(cls: &TypeRef) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut missing = BTreeSet::new();
    for t in cls.mro() {
        for name in t.own_member_names() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if cls.lookup(&name).is_some_and(|v| v.is_abstract()) {
                missing.insert(name);
            }
        }
    }
    missing
}
