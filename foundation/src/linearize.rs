//! C3 linearization of a new type's ancestry.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::TypeRef;

/// Computes the ancestry of a type declared with `bases`, the type itself
/// excluded.
///
/// The result is the C3 merge of every base's MRO followed by the base list,
/// so each base precedes its own ancestors and declaration order is kept
/// among siblings.
///
/// # Errors
///
/// [`Error::DuplicateBase`] when a base is listed twice, and
/// [`Error::Linearization`] when no consistent order exists.
pub fn linearize(bases: &[TypeRef]) -> Result<Vec<TypeRef>> {
    for (i, base) in bases.iter().enumerate() {
        if bases[..i].iter().any(|b| Arc::ptr_eq(b, base)) {
            return Err(Error::DuplicateBase(base.name().to_string()));
        }
    }

    let mut sequences: Vec<Vec<TypeRef>> = bases.iter().map(|b| b.mro()).collect();
    sequences.push(bases.to_vec());

    let mut out = Vec::new();
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Ok(out);
        }
        let candidate = sequences
            .iter()
            .map(|s| &s[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|s| s[1..].iter().any(|t| Arc::ptr_eq(t, head)))
            })
            .cloned();
        let Some(next) = candidate else {
            return Err(Error::Linearization {
                bases: bases.iter().map(|b| b.name().to_string()).collect(),
            });
        };
        for seq in &mut sequences {
            if Arc::ptr_eq(&seq[0], &next) {
                seq.remove(0);
            }
        }
        out.push(next);
    }
}
