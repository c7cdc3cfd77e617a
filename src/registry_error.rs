use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error produced by a user-supplied factory.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised by [`Registry`](crate::Registry) registration and resolution.
///
/// Nothing here is retried internally. Errors returned by nested `resolve` calls inside a
/// factory travel through it unchanged (with `?`), so the top-level caller sees the
/// original kind, e.g. a [`CycleDetected`](RegistryError::CycleDetected) raised three
/// levels down.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A resolver is already registered under this key.
    #[error("Cannot override resolver for key: {key}")]
    DuplicateKey { key: String },

    /// No resolver was ever registered under this key.
    #[error("No resolver found for key: {key}")]
    MissingResolver { key: String },

    /// The key is already being resolved further up the current call chain.
    ///
    /// `path` starts at the outermost key and ends with the repeated one.
    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// The resolved value is not of the requested type.
    #[error("Type mismatch for key {key}: expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// A factory argument is missing or of the wrong type.
    #[error("Argument {index} is missing or not of type {expected}")]
    Argument { index: usize, expected: &'static str },

    /// Failure reported by a factory itself.
    #[error(transparent)]
    Factory(#[from] BoxError),
}

impl RegistryError {
    /// Wraps a factory's own failure without altering its message or source chain.
    ///
    /// ```rust
    /// use resolver_registry::RegistryError;
    ///
    /// let err = RegistryError::factory("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn factory(err: impl Into<BoxError>) -> Self {
        RegistryError::Factory(err.into())
    }

    /// The detected cycle rendered as `A -> B -> A`, if this is a cycle error.
    pub fn cycle(&self) -> Option<String> {
        match self {
            RegistryError::CycleDetected { path } => Some(path.join(" -> ")),
            _ => None,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, RegistryError::CycleDetected { .. })
    }
}
