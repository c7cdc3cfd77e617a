//! # Resolver Registry
//!
//! A lazy dependency-resolution registry: register named factories ("resolvers"), then
//! resolve values by name. Factories may resolve their own dependencies through the
//! [`Resolver`] they receive, and results are optionally memoized.
//!
//! ## Quick Start
//!
//! ```rust
//! use resolver_registry::Registry;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//!
//! // Cached: the factory runs once, every caller shares the value
//! registry.add("greeting", |_, _| Ok("Hello".to_string())).unwrap();
//!
//! // Uncached: the factory runs on every resolution
//! registry.factory("message", |r, _| {
//!     let greeting: Arc<String> = r.resolve("greeting")?;
//!     Ok(format!("{greeting}, World!"))
//! }).unwrap();
//!
//! let message: Arc<String> = registry.resolve("message").unwrap();
//! assert_eq!(&*message, "Hello, World!");
//! ```
//!
//! ## Features
//!
//! - **Lazy**: factories run only when their key (or a dependent) is resolved
//! - **Memoization per key**: [`Registry::add`] caches the first value, [`Registry::factory`] never caches
//! - **Cycle detection**: walking into a circular dependency fails with
//!   [`RegistryError::CycleDetected`] reporting the path, e.g. `A -> B -> A`
//! - **Thread-safe**: the active path is per call, so concurrent resolutions never interfere
//! - **Tracing support**: `tracing` events plus an optional per-registry callback
//!
//! ## Main Items
//!
//! - [`Registry`] - register resolvers and resolve values
//! - [`Resolver`] - handle passed to factories for recursive resolution
//! - [`Args`] - arguments forwarded to parametrized factories
//! - [`define_registry!`] - isolated process-global registries
//! - [`RegistryEvent`] - events delivered to the trace callback

mod args;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod resolver;

// Re-export the main public API
pub use args::Args;
pub use registry::{Key, Registry, TraceCallback, Value};
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::RegistryEvent;
pub use resolver::Resolver;
