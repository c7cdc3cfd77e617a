//! Caller-supplied arguments forwarded to parametrized factories.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::RegistryError;

/// An ordered, type-erased argument list.
///
/// Arguments are forwarded verbatim to the factory on a cache miss. Cached hits never see
/// them, so parametrized resolvers are normally registered with
/// [`Registry::factory`](crate::Registry::factory).
///
/// ```rust
/// use resolver_registry::Args;
///
/// let args = Args::new().with(8080u16).with("localhost".to_string());
/// assert_eq!(*args.get::<u16>(0).unwrap(), 8080);
/// assert_eq!(args.get::<String>(1).unwrap(), "localhost");
/// assert!(args.get::<u16>(1).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Args {
    values: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument, builder style.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    /// Borrows the argument at `index` as a `T`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Argument`] when there is no argument at `index` or it is not a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> Result<&T, RegistryError> {
        self.values
            .get(index)
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or_else(|| RegistryError::Argument {
                index,
                expected: type_name::<T>(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("len", &self.values.len()).finish()
    }
}
