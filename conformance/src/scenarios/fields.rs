//! A field descriptor that learns its own name when its owner is built.

use std::sync::Arc;

use classinit::{Descriptor, Error, Instance, Pipeline, TypeDefinition, TypeRef, Value};
use parking_lot::RwLock;

/// Stores its value in the instance under the name it was declared with.
///
/// Until bound, reads and writes fail.
#[derive(Debug, Default)]
pub struct NamedField {
    binding: RwLock<Option<(String, String)>>,
}

impl NamedField {
    /// An unbound field.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Member name, once bound.
    pub fn name(&self) -> Option<String> {
        self.binding.read().as_ref().map(|(_, name)| name.clone())
    }

    /// Owning type name, once bound.
    pub fn owner(&self) -> Option<String> {
        self.binding.read().as_ref().map(|(owner, _)| owner.clone())
    }

    fn slot(&self) -> classinit::Result<String> {
        self.name()
            .ok_or_else(|| Error::raised("AttributeError", "field was never bound to a type"))
    }

    /// Writes the field on `obj`.
    ///
    /// # Errors
    ///
    /// Fails if the field was never bound.
    pub fn store(&self, obj: &mut Instance, value: impl Into<Value>) -> classinit::Result<()> {
        obj.set(self.slot()?, value);
        Ok(())
    }

    /// Reads the field from `obj`.
    ///
    /// # Errors
    ///
    /// Fails if the field was never bound or was never written.
    pub fn load(&self, obj: &Instance) -> classinit::Result<Value> {
        obj.get(&self.slot()?)
    }
}

impl Descriptor for NamedField {
    fn bind_to_owner(&self, owner: &TypeRef, name: &str) -> classinit::Result<()> {
        *self.binding.write() = Some((owner.name().to_string(), name.to_string()));
        Ok(())
    }
}

/// Declares `Record` with one self-naming field `a`.
///
/// # Errors
///
/// Any construction error.
pub fn declare_record(pipeline: &Pipeline) -> classinit::Result<(TypeRef, Arc<NamedField>)> {
    let field = NamedField::new();
    let member = Value::Descriptor(Arc::clone(&field) as Arc<dyn Descriptor>);
    let record = pipeline.construct(TypeDefinition::new("Record").body(move |ns| ns.set("a", member)))?;
    Ok((record, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_knows_its_name_after_construction() {
        let (record, field) = declare_record(&Pipeline::default()).unwrap();
        assert_eq!(field.name().as_deref(), Some("a"));
        assert_eq!(field.owner().as_deref(), Some("Record"));

        let mut obj = record.instantiate().unwrap();
        field.store(&mut obj, 4).unwrap();
        assert_eq!(field.load(&obj).unwrap(), Value::Int(4));
    }

    #[test]
    fn unbound_field_refuses_access() {
        let field = NamedField::new();
        let t = Pipeline::default().construct(TypeDefinition::new("T")).unwrap();
        let obj = t.instantiate().unwrap();
        assert!(field.load(&obj).unwrap_err().is_raised("AttributeError"));
    }
}
