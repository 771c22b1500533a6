//! Reference hierarchies shared by the validators and `classinit-describe`.
//!
//! Each scenario declares a small hierarchy through a caller-supplied
//! [`Pipeline`], so the same code runs under every configuration.

pub mod fields;
pub mod ordering;
pub mod registry;

use anyhow::Context;
use classinit::{Pipeline, TypeRef};

pub use fields::NamedField;
pub use registry::Registry;

/// A constructed hierarchy, ready to be described.
#[derive(Debug)]
pub struct Scenario {
    /// Short identifier.
    pub name: &'static str,
    /// The types declared by the scenario, in declaration order.
    pub types: Vec<TypeRef>,
}

/// Builds every reference scenario.
///
/// # Errors
///
/// Returns an error if a scenario type cannot be constructed.
pub fn build_all(pipeline: &Pipeline) -> anyhow::Result<Vec<Scenario>> {
    let registry = Registry::declare(pipeline).context("declaring Registry")?;
    let first = registry.register(pipeline, "A").context("registering A")?;
    let second = registry.register(pipeline, "B").context("registering B")?;

    let (record, _field) = fields::declare_record(pipeline).context("declaring Record")?;
    let ordered = ordering::declare(pipeline).context("declaring AttributeOrder")?;

    Ok(vec![
        Scenario {
            name: "registry",
            types: vec![registry.root().clone(), first, second],
        },
        Scenario {
            name: "self-naming-field",
            types: vec![record],
        },
        Scenario {
            name: "attribute-order",
            types: vec![ordered],
        },
    ])
}
