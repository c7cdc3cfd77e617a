//! Call-scoped resolution state.
//!
//! A [`Resolver`] is created for every top-level `resolve` on a [`Registry`] and handed to
//! each factory it invokes, so a factory resolves its own dependencies through the same
//! active path. The path lives and dies with the top-level call: it cannot leak between
//! calls, and concurrent resolutions on other threads each have their own.

use std::{
    borrow::Borrow,
    fmt,
    hash::Hash,
    iter,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use tracing::{debug, trace, warn};

use crate::registry::{downcast, Key, Value};
use crate::{Args, Registry, RegistryError, RegistryEvent};

/// Handle passed to factories for recursive resolution.
///
/// ```
/// use resolver_registry::Registry;
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// registry.factory("depth", |r, _| Ok(r.path().len())).unwrap();
/// registry.factory("outer", |r, _| r.resolve::<usize, _>("depth").map(|d| *d)).unwrap();
///
/// let depth: Arc<usize> = registry.resolve("outer").unwrap();
/// assert_eq!(*depth, 2);
/// ```
pub struct Resolver<'r, K: Key = String> {
    registry: &'r Registry<K>,
    path: Vec<K>,
}

impl<'r, K: Key> Resolver<'r, K> {
    pub(crate) fn new(registry: &'r Registry<K>) -> Self {
        Self {
            registry,
            path: Vec::new(),
        }
    }

    /// The registry this resolution runs against.
    pub fn registry(&self) -> &'r Registry<K> {
        self.registry
    }

    /// Keys currently mid-resolution, outermost first.
    pub fn path(&self) -> &[K] {
        &self.path
    }

    /// Resolves a dependency with no arguments.
    pub fn resolve<T, Q>(&mut self, key: &Q) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        self.resolve_with(key, &Args::new())
    }

    /// Resolves a dependency, forwarding `args` to its factory on a cache miss.
    pub fn resolve_with<T, Q>(&mut self, key: &Q, args: &Args) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        let value = self.resolve_value(key, args)?;
        downcast(key, value)
    }

    fn resolve_value<Q>(&mut self, key: &Q, args: &Args) -> Result<Value, RegistryError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        let registry = self.registry;

        // Cache hits skip the factory, the arguments and the cycle check.
        if let Some(value) = registry.cached_value(key) {
            trace!(key = %key, "served from cache");
            registry.emit_event(&RegistryEvent::Resolve {
                key: key.to_string(),
                cached: true,
            });
            return Ok(value);
        }

        let Some(registration) = registry.registration(key) else {
            debug!(key = %key, "no resolver registered");
            registry.emit_event(&RegistryEvent::Missing {
                key: key.to_string(),
            });
            return Err(RegistryError::MissingResolver {
                key: key.to_string(),
            });
        };

        if self.path.iter().any(|active| Borrow::<Q>::borrow(active) == key) {
            return Err(self.cycle(key));
        }

        let produced = {
            let mut frame = Frame::enter(self, key.to_owned());
            debug!(key = %key, depth = frame.depth, "invoking resolver");
            registration.factory.produce(&mut *frame, args)
        };
        let value = produced?;

        let value = if registration.cacheable {
            registry.store(key.to_owned(), value)
        } else {
            value
        };

        registry.emit_event(&RegistryEvent::Resolve {
            key: key.to_string(),
            cached: false,
        });
        Ok(value)
    }

    /// Builds the cycle error for `key`; the active path is left as it is.
    fn cycle<Q>(&self, key: &Q) -> RegistryError
    where
        Q: fmt::Display + ?Sized,
    {
        let path: Vec<String> = self
            .path
            .iter()
            .map(ToString::to_string)
            .chain(iter::once(key.to_string()))
            .collect();
        let rendered = path.join(" -> ");

        warn!(path = %rendered, "circular dependency detected");
        self.registry
            .emit_event(&RegistryEvent::Cycle { path: rendered });

        RegistryError::CycleDetected { path }
    }
}

/// One entry on the active path; popped when dropped, including while unwinding.
struct Frame<'a, 'r, K: Key> {
    resolver: &'a mut Resolver<'r, K>,
    depth: usize,
}

impl<'a, 'r, K: Key> Frame<'a, 'r, K> {
    fn enter(resolver: &'a mut Resolver<'r, K>, key: K) -> Self {
        let depth = resolver.path.len();
        resolver.path.push(key);
        Self { resolver, depth }
    }
}

impl<'r, K: Key> Deref for Frame<'_, 'r, K> {
    type Target = Resolver<'r, K>;

    fn deref(&self) -> &Self::Target {
        self.resolver
    }
}

impl<K: Key> DerefMut for Frame<'_, '_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resolver
    }
}

impl<K: Key> Drop for Frame<'_, '_, K> {
    fn drop(&mut self) {
        self.resolver.path.truncate(self.depth);
    }
}

impl<K: Key> fmt::Debug for Resolver<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        f.debug_struct("Resolver").field("path", &path).finish()
    }
}
