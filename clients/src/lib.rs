//! Command-line plumbing shared by the classinit binaries: pipeline
//! configuration flags and logging setup.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use classinit::{BinderOrder, PipelineConfig, RootPolicy};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// `--binder-order` values.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BinderOrderArg {
    /// Bind descriptors after the hook chain.
    AfterHooks,
    /// Bind descriptors before the hook chain.
    BeforeHooks,
}

impl From<BinderOrderArg> for BinderOrder {
    fn from(arg: BinderOrderArg) -> Self {
        match arg {
            BinderOrderArg::AfterHooks => BinderOrder::AfterHooks,
            BinderOrderArg::BeforeHooks => BinderOrder::BeforeHooks,
        }
    }
}

/// `--root-policy` values.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RootPolicyArg {
    /// Unconsumed extra arguments fail the declaration.
    Strict,
    /// Unconsumed extra arguments are dropped.
    Permissive,
}

impl From<RootPolicyArg> for RootPolicy {
    fn from(arg: RootPolicyArg) -> Self {
        match arg {
            RootPolicyArg::Strict => RootPolicy::Strict,
            RootPolicyArg::Permissive => RootPolicy::Permissive,
        }
    }
}

/// Pipeline configuration flags. Flags override the config file.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// TOML file with `binder-order` and `root-policy` keys.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// When descriptors are bound relative to subclass-init hooks.
    #[arg(long, value_enum)]
    pub binder_order: Option<BinderOrderArg>,

    /// What happens to extra arguments no hook consumed.
    #[arg(long, value_enum)]
    pub root_policy: Option<RootPolicyArg>,
}

impl PipelineArgs {
    /// Resolves the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                PipelineConfig::from_toml_str(&source)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => PipelineConfig::default(),
        };
        if let Some(order) = self.binder_order {
            config.binder_order = order.into();
        }
        if let Some(policy) = self.root_policy {
            config.root_policy = policy.into();
        }
        debug!(?config, "resolved pipeline configuration");
        Ok(config)
    }
}

/// Installs the global subscriber. `RUST_LOG` wins; otherwise `verbose`
/// raises the default level from `warn` to `debug` (1) or `trace` (2+).
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = PipelineArgs {
            config: None,
            binder_order: Some(BinderOrderArg::BeforeHooks),
            root_policy: None,
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.binder_order, BinderOrder::BeforeHooks);
        assert_eq!(config.root_policy, RootPolicy::Strict);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = PipelineArgs {
            config: Some(PathBuf::from("/nonexistent/classinit.toml")),
            binder_order: None,
            root_policy: None,
        };
        let err = args.resolve().unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
