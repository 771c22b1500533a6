//! Error taxonomy for type construction and instantiation.
//!
//! Errors raised by user code (type bodies, subclass-init hooks,
//! `bind_to_owner` implementations, class decorators, method bodies) travel
//! through the pipeline unchanged: the driver propagates them with `?` and
//! never re-wraps them, so the caller observes exactly the value the user
//! code returned.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while declaring or instantiating a type.
#[derive(Debug, Error)]
pub enum Error {
    /// Extra arguments reached the end of the hook chain without being consumed.
    #[error("{type_name}.__init_subclass__() got unexpected keyword argument(s): {}", names.join(", "))]
    ChainDelegation {
        /// Name of the type under construction.
        type_name: String,
        /// The unconsumed argument names, in declaration order.
        names: Vec<String>,
    },

    /// Instantiation of a type that still has unimplemented abstract members.
    #[error("can't instantiate abstract type {type_name} with abstract member(s): {}", names.join(", "))]
    AbstractMember {
        /// Name of the type that was instantiated.
        type_name: String,
        /// Unimplemented abstract member names, sorted.
        names: Vec<String>,
    },

    /// An error raised by user code.
    #[error("{kind}: {message}")]
    Raised {
        /// Error class, e.g. `"KeyError"`.
        kind: String,
        /// Human-readable message.
        message: String,
    },

    /// A key was read from a namespace that never received it.
    #[error("namespace has no key {key:?}")]
    Lookup {
        /// The missing key.
        key: String,
    },

    /// Attribute lookup failed on a type or instance.
    #[error("{owner} has no attribute {name:?}")]
    Attribute {
        /// Type or instance description.
        owner: String,
        /// The missing attribute.
        name: String,
    },

    /// The same base was listed twice.
    #[error("duplicate base type {0}")]
    DuplicateBase(String),

    /// No consistent method resolution order exists for the declared bases.
    #[error("cannot create a consistent method resolution order for bases {}", bases.join(", "))]
    Linearization {
        /// The declared bases, in declaration order.
        bases: Vec<String>,
    },

    /// An ancestor declares a subclass-init entry that is not a hook.
    #[error("{owner}.__init_subclass__ is not a hook")]
    InvalidHook {
        /// Type whose own members hold the non-hook value.
        owner: String,
    },

    /// A pipeline-reserved extra argument carried the wrong kind of value.
    #[error("invalid value for argument {name:?}: expected {expected}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// What was expected instead.
        expected: &'static str,
    },

    /// The pipeline configuration could not be parsed.
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Builds the error user code returns to signal a failure.
    ///
    /// ```
    /// let err = classinit::Error::raised("KeyError", "xxx");
    /// assert_eq!(err.to_string(), "KeyError: xxx");
    /// ```
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Raised {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a user-raised error of the given kind.
    pub fn is_raised(&self, kind: &str) -> bool {
        matches!(self, Self::Raised { kind: k, .. } if k == kind)
    }
}
