//! The resolution core: named factories, per-key cache policy and memoized results.
//!
//! A [`Registry`] is created empty, filled through [`Registry::register`] (or its
//! [`add`](Registry::add) / [`factory`](Registry::factory) forms) and queried with
//! [`Registry::resolve`]. Factories receive a [`Resolver`] so they can resolve their own
//! dependencies; the resolver carries the active path used for cycle detection.
//!
//! # Examples
//!
//! ```
//! use resolver_registry::Registry;
//! use std::sync::Arc;
//!
//! struct Config { url: String }
//! struct Database { url: String }
//!
//! let registry = Registry::new();
//! registry.add("config", |_, _| Ok(Config { url: "postgres://localhost".into() })).unwrap();
//! registry.add("db", |r, _| {
//!     let config: Arc<Config> = r.resolve("config")?;
//!     Ok(Database { url: config.url.clone() })
//! }).unwrap();
//!
//! let db: Arc<Database> = registry.resolve("db").unwrap();
//! assert_eq!(db.url, "postgres://localhost");
//! ```

use std::{
    any::{type_name, Any},
    borrow::Borrow,
    collections::HashMap,
    fmt,
    hash::Hash,
    marker::PhantomData,
    sync::{Arc, Mutex, RwLock},
};

use tracing::{debug, warn};

use crate::{Args, RegistryError, RegistryEvent, Resolver};

/// Type-erased value produced by a factory.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because a registry may be shared globally.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Identifier under which a resolver is registered.
///
/// Implemented for every comparable, hashable, displayable type; `String` and small
/// `Copy` enums are the usual choices.
pub trait Key: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static {}

impl<T> Key for T where T: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static {}

/// Object-safe view of a typed factory.
pub(crate) trait Produce<K: Key>: Send + Sync {
    fn produce(&self, resolver: &mut Resolver<'_, K>, args: &Args) -> Result<Value, RegistryError>;
}

struct Typed<F, T> {
    factory: F,
    _output: PhantomData<fn() -> T>,
}

impl<K, F, T> Produce<K> for Typed<F, T>
where
    K: Key,
    T: Send + Sync + 'static,
    F: Fn(&mut Resolver<'_, K>, &Args) -> Result<T, RegistryError> + Send + Sync,
{
    fn produce(&self, resolver: &mut Resolver<'_, K>, args: &Args) -> Result<Value, RegistryError> {
        (self.factory)(resolver, args).map(|value| Arc::new(value) as Value)
    }
}

/// A registered factory together with its cache policy.
#[derive(Clone)]
pub(crate) struct Registration<K: Key> {
    pub(crate) factory: Arc<dyn Produce<K>>,
    pub(crate) cacheable: bool,
}

/// Lazy dependency-resolution registry.
///
/// Keys are registered at most once for the lifetime of the registry; cached values are
/// never evicted. All operations take `&self`, so a registry can live in a `static`
/// (see [`define_registry!`](crate::define_registry)) or behind an `Arc`.
///
/// No internal lock is held while a factory or the trace callback runs.
pub struct Registry<K: Key = String> {
    factories: RwLock<HashMap<K, Registration<K>>>,
    cache: Mutex<HashMap<K, Value>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Registry {
    /// Creates an empty `String`-keyed registry.
    ///
    /// Use `Registry::<K>::default()` for other key types.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Key> Default for Registry<K> {
    fn default() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }
}

impl<K: Key> fmt::Debug for Registry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("resolvers", &self.len())
            .field(
                "cached",
                &self.cache.lock().unwrap_or_else(|p| p.into_inner()).len(),
            )
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tracing callback support
// -------------------------------------------------------------------------------------------------

impl<K: Key> Registry<K> {
    /// Sets a tracing callback that will be invoked on every registry interaction.
    ///
    /// The callback runs without any registry lock held, so it may itself query the
    /// registry.
    ///
    /// # Example
    /// ```rust
    /// use resolver_registry::Registry;
    ///
    /// let registry = Registry::new();
    /// registry.set_trace_callback(|event| println!("[registry-trace] {event}"));
    /// ```
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback (disables registry tracing).
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub(crate) fn emit_event(&self, event: &RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Registration
// -------------------------------------------------------------------------------------------------

impl<K: Key> Registry<K> {
    /// Registers `factory` under `key`.
    ///
    /// When `cacheable` is set, the first successfully produced value is memoized and
    /// returned by every later resolution; otherwise the factory runs on every call.
    /// The factory is neither invoked nor checked until the key is resolved.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateKey`] if `key` is already registered, in either mode.
    /// The registry is left untouched.
    pub fn register<T, F>(
        &self,
        key: impl Into<K>,
        cacheable: bool,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_, K>, &Args) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        let key = key.into();

        let mut factories = self.factories.write().unwrap_or_else(|p| p.into_inner());
        if factories.contains_key(&key) {
            drop(factories);

            warn!(key = %key, "rejected duplicate resolver registration");
            self.emit_event(&RegistryEvent::Duplicate {
                key: key.to_string(),
            });
            return Err(RegistryError::DuplicateKey {
                key: key.to_string(),
            });
        }

        let registration = Registration {
            factory: Arc::new(Typed {
                factory,
                _output: PhantomData,
            }),
            cacheable,
        };
        factories.insert(key.clone(), registration);
        drop(factories);

        debug!(key = %key, cacheable, "registered resolver");
        self.emit_event(&RegistryEvent::Register {
            key: key.to_string(),
            cacheable,
        });

        Ok(())
    }

    /// Registers a cached resolver: the factory runs once, its value is shared afterwards.
    pub fn add<T, F>(&self, key: impl Into<K>, factory: F) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_, K>, &Args) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        self.register(key, true, factory)
    }

    /// Registers an uncached resolver: the factory runs on every resolution.
    pub fn factory<T, F>(&self, key: impl Into<K>, factory: F) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_, K>, &Args) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        self.register(key, false, factory)
    }
}

// -------------------------------------------------------------------------------------------------
// Resolution
// -------------------------------------------------------------------------------------------------

impl<K: Key> Registry<K> {
    /// Resolves `key` with no arguments.
    ///
    /// Each call starts a fresh resolution with an empty active path.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::MissingResolver`] if `key` (or a dependency) is not registered
    /// - [`RegistryError::CycleDetected`] if resolution walks into a circular dependency
    /// - [`RegistryError::TypeMismatch`] if the value is not a `T`
    /// - whatever a factory on the way returned
    pub fn resolve<T, Q>(&self, key: &Q) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        Resolver::new(self).resolve(key)
    }

    /// Resolves `key`, forwarding `args` to the factory on a cache miss.
    pub fn resolve_with<T, Q>(&self, key: &Q, args: &Args) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        Resolver::new(self).resolve_with(key, args)
    }

    /// Resolves `key` and returns an owned clone of the value.
    pub fn resolve_cloned<T, Q>(&self, key: &Q) -> Result<T, RegistryError>
    where
        T: Send + Sync + Clone + 'static,
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        let arc = self.resolve::<T, Q>(key)?;
        Ok((*arc).clone())
    }

    /// Returns the cached value for `key`, resolving it without arguments on a miss.
    ///
    /// Same as [`resolve`](Registry::resolve), which already serves cache hits first.
    pub fn resolve_from_cache<T, Q>(&self, key: &Q) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ToOwned<Owned = K> + ?Sized,
    {
        self.resolve(key)
    }

    /// Whether a resolver is registered under `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.factories
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(key)
    }

    /// Whether `key` has a memoized value.
    pub fn is_cached<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(key)
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.factories
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn registration<Q>(&self, key: &Q) -> Option<Registration<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.factories
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    pub(crate) fn cached_value<Q>(&self, key: &Q) -> Option<Value>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    /// Stores `value` unless another resolution got there first; returns the winner.
    pub(crate) fn store(&self, key: K, value: Value) -> Value {
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(key)
            .or_insert(value)
            .clone()
    }
}

pub(crate) fn downcast<T, Q>(key: &Q, value: Value) -> Result<Arc<T>, RegistryError>
where
    T: Send + Sync + 'static,
    Q: fmt::Display + ?Sized,
{
    value
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            key: key.to_string(),
            expected: type_name::<T>(),
        })
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Counted(usize);

    fn counting(registry: &Registry, key: &str, cacheable: bool) -> Arc<AtomicUsize> {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = counter.clone();
        registry
            .register(key, cacheable, move |_, _| {
                Ok(Counted(calls.fetch_add(1, Ordering::SeqCst) + 1))
            })
            .unwrap();
        counter
    }

    #[test]
    fn test_register_and_resolve_primitive() -> Result<(), RegistryError> {
        let registry = Registry::new();
        registry.add("answer", |_, _| Ok(42i32))?;

        let num: Arc<i32> = registry.resolve("answer")?;
        assert_eq!(*num, 42);

        let num_2 = registry.resolve::<i32, _>("answer")?;
        assert_eq!(*num_2, 42);

        Ok(())
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("anything"));
    }

    #[test]
    fn test_cached_factory_runs_once() {
        let registry = Registry::new();
        let counter = counting(&registry, "counter", true);

        for _ in 0..3 {
            let value: Arc<Counted> = registry.resolve("counter").unwrap();
            assert_eq!(*value, Counted(1));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(registry.is_cached("counter"));
    }

    #[test]
    fn test_cached_resolution_returns_same_instance() {
        let registry = Registry::new();
        registry.add("shared", |_, _| Ok(String::from("shared"))).unwrap();

        let a: Arc<String> = registry.resolve("shared").unwrap();
        let b: Arc<String> = registry.resolve("shared").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_uncached_factory_runs_every_time() {
        let registry = Registry::new();
        let counter = counting(&registry, "counter", false);

        for expected in 1..=3 {
            let value: Arc<Counted> = registry.resolve("counter").unwrap();
            assert_eq!(*value, Counted(expected));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(!registry.is_cached("counter"));
    }

    #[test]
    fn test_duplicate_key_rejected_in_any_mode() {
        let registry = Registry::new();
        registry.add("a", |_, _| Ok(1u8)).unwrap();

        let err = registry.factory("a", |_, _| Ok(2u8)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { ref key } if key == "a"));
        let err = registry.add("a", |_, _| Ok(3u8)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot override resolver for key: a");

        let value: Arc<u8> = registry.resolve("a").unwrap();
        assert_eq!(*value, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_resolver() {
        let registry = Registry::new();
        let err = registry.resolve::<i32, _>("foobar").unwrap_err();
        assert_eq!(err.to_string(), "No resolver found for key: foobar");
    }

    #[test]
    fn test_type_mismatch_does_not_poison_cache() {
        let registry = Registry::new();
        registry.add("number", |_, _| Ok(7u64)).unwrap();

        let err = registry.resolve::<String, _>("number").unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { .. }));

        let value: Arc<u64> = registry.resolve("number").unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn test_resolve_cloned() {
        let registry = Registry::new();
        registry.add("greeting", |_, _| Ok("hello".to_string())).unwrap();
        let value: String = registry.resolve_cloned("greeting").unwrap();
        assert_eq!(value, "hello");
    }

    #[test]
    fn test_resolve_from_cache_falls_back_to_resolve() {
        let registry = Registry::new();
        let counter = counting(&registry, "lazy", true);
        assert!(!registry.is_cached("lazy"));

        let first: Arc<Counted> = registry.resolve_from_cache("lazy").unwrap();
        let second: Arc<Counted> = registry.resolve_from_cache("lazy").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(matches!(
            registry.resolve_from_cache::<Counted, _>("absent"),
            Err(RegistryError::MissingResolver { .. })
        ));
    }

    #[test]
    fn test_resolve_from_cache_hit_is_one_cached_resolve() {
        let registry = Registry::new();
        registry.add("a", |_, _| Ok(1i32)).unwrap();
        let _ = registry.resolve::<i32, _>("a");

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        let _ = registry.resolve_from_cache::<i32, _>("a");
        assert_eq!(
            *events.lock().unwrap(),
            vec!["resolve { key: a, cached: true }"]
        );
    }

    #[test]
    fn test_store_keeps_first_writer() {
        let registry = Registry::new();
        let first = registry.store("k".to_string(), Arc::new(1i32));
        let second = registry.store("k".to_string(), Arc::new(2i32));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*downcast::<i32, str>("k", second).unwrap(), 1);
    }

    #[test]
    fn test_factory_error_leaves_key_uncached() {
        let registry = Registry::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        registry
            .add("flaky", move |_, _| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RegistryError::factory("not yet"))
                } else {
                    Ok(5i32)
                }
            })
            .unwrap();

        let err = registry.resolve::<i32, _>("flaky").unwrap_err();
        assert_eq!(err.to_string(), "not yet");
        assert!(!registry.is_cached("flaky"));

        let value: Arc<i32> = registry.resolve("flaky").unwrap();
        assert_eq!(*value, 5);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_trace_callback_events() {
        use std::sync::Mutex as StdMutex;

        let registry = Registry::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        registry.add("a", |_, _| Ok(1i32)).unwrap();
        let _ = registry.add("a", |_, _| Ok(2i32));
        let _ = registry.resolve::<i32, _>("a");
        let _ = registry.resolve::<i32, _>("a");
        let _ = registry.resolve::<i32, _>("b");

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "register { key: a, cacheable: true }",
                "duplicate { key: a }",
                "resolve { key: a, cached: false }",
                "resolve { key: a, cached: true }",
                "missing { key: b }",
            ]
        );
    }

    #[test]
    fn test_clear_trace_callback_stops_events() {
        use std::sync::Mutex as StdMutex;

        let registry = Registry::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        registry.add("a", |_, _| Ok(1i32)).unwrap();
        registry.clear_trace_callback();
        let _ = registry.resolve::<i32, _>("a");

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_callback_may_query_registry() {
        let registry = Arc::new(Registry::new());
        let inner = Arc::downgrade(&registry);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        registry.set_trace_callback(move |_| {
            if let Some(registry) = inner.upgrade() {
                seen_clone.store(registry.len(), Ordering::SeqCst);
            }
        });

        registry.add("a", |_, _| Ok(())).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_format() {
        let registry = Registry::new();
        registry.add("a", |_, _| Ok(1i32)).unwrap();
        let _ = registry.resolve::<i32, _>("a");
        assert_eq!(format!("{registry:?}"), "Registry { resolvers: 1, cached: 1 }");
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
        assert_send_sync::<Registry<u32>>();
    }
}
