//! Macros for creating global registries.

/// Creates an isolated, process-global registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - a lazily created `static` [`Registry`](crate::Registry) keyed by `String` (hidden)
/// - `registry()` returning it
/// - free functions delegating to it
///
/// # Examples
///
/// ```rust
/// use resolver_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// services::add("port", |_, _| Ok(8080u16)).unwrap();
/// services::add("address", |r, _| {
///     let port: Arc<u16> = r.resolve("port")?;
///     Ok(format!("localhost:{port}"))
/// }).unwrap();
///
/// let address: Arc<String> = services::resolve("address").unwrap();
/// assert_eq!(&**address, "localhost:8080");
/// ```
///
/// # Multiple Registries
///
/// Every invocation is completely isolated:
///
/// ```rust
/// use resolver_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::add("url", |_, _| Ok("postgres://localhost".to_string())).unwrap();
/// cache::add("url", |_, _| Ok("redis://localhost".to_string())).unwrap();
///
/// assert_eq!(database::resolve_cloned::<String>("url").unwrap(), "postgres://localhost");
/// assert_eq!(cache::resolve_cloned::<String>("url").unwrap(), "redis://localhost");
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            #![allow(dead_code)]

            use std::sync::{Arc, LazyLock};

            use $crate::{Args, Registry, RegistryError, RegistryEvent, Resolver};

            static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

            /// The registry behind this module's free functions.
            pub fn registry() -> &'static Registry {
                &REGISTRY
            }

            /// Register a resolver, cached or not.
            pub fn register<T, F>(
                key: impl Into<String>,
                cacheable: bool,
                factory: F,
            ) -> Result<(), RegistryError>
            where
                T: Send + Sync + 'static,
                F: Fn(&mut Resolver<'_>, &Args) -> Result<T, RegistryError> + Send + Sync + 'static,
            {
                REGISTRY.register(key, cacheable, factory)
            }

            /// Register a cached resolver.
            pub fn add<T, F>(key: impl Into<String>, factory: F) -> Result<(), RegistryError>
            where
                T: Send + Sync + 'static,
                F: Fn(&mut Resolver<'_>, &Args) -> Result<T, RegistryError> + Send + Sync + 'static,
            {
                REGISTRY.add(key, factory)
            }

            /// Register an uncached resolver.
            pub fn factory<T, F>(key: impl Into<String>, factory: F) -> Result<(), RegistryError>
            where
                T: Send + Sync + 'static,
                F: Fn(&mut Resolver<'_>, &Args) -> Result<T, RegistryError> + Send + Sync + 'static,
            {
                REGISTRY.factory(key, factory)
            }

            /// Resolve a value.
            pub fn resolve<T: Send + Sync + 'static>(key: &str) -> Result<Arc<T>, RegistryError> {
                REGISTRY.resolve(key)
            }

            /// Resolve a value, forwarding arguments to the factory on a cache miss.
            pub fn resolve_with<T: Send + Sync + 'static>(
                key: &str,
                args: &Args,
            ) -> Result<Arc<T>, RegistryError> {
                REGISTRY.resolve_with(key, args)
            }

            /// Resolve a value and clone it out of the `Arc`.
            pub fn resolve_cloned<T: Send + Sync + Clone + 'static>(
                key: &str,
            ) -> Result<T, RegistryError> {
                REGISTRY.resolve_cloned(key)
            }

            /// Return the cached value, resolving on a miss.
            pub fn resolve_from_cache<T: Send + Sync + 'static>(
                key: &str,
            ) -> Result<Arc<T>, RegistryError> {
                REGISTRY.resolve_from_cache(key)
            }

            /// Check if a resolver is registered.
            pub fn contains(key: &str) -> bool {
                REGISTRY.contains(key)
            }

            /// Check if a value is memoized.
            pub fn is_cached(key: &str) -> bool {
                REGISTRY.is_cached(key)
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}
