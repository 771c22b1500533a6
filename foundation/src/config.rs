//! Pipeline configuration.
//!
//! ```
//! use classinit::{BinderOrder, PipelineConfig, RootPolicy};
//!
//! let config = PipelineConfig::from_toml_str(
//!     r#"
//!     binder-order = "before-hooks"
//!     root-policy = "permissive"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.binder_order, BinderOrder::BeforeHooks);
//! assert_eq!(config.root_policy, RootPolicy::Permissive);
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::hooks::RootPolicy;

/// When the descriptor binder runs relative to the hook chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinderOrder {
    /// Hooks first, then binding. Hooks cannot observe bound names, but
    /// `bind_to_owner` sees everything the hooks set on the type.
    #[default]
    AfterHooks,
    /// Binding first, then hooks.
    BeforeHooks,
}

/// Knobs of the construction driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Ordering of the descriptor binder.
    pub binder_order: BinderOrder,
    /// Treatment of extra arguments nobody consumed.
    pub root_policy: RootPolicy,
}

impl PipelineConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) on malformed TOML,
    /// unknown keys, or unknown enum values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}
