//! Basic usage example for resolver-registry.
//!
//! Demonstrates:
//! - Registering cached (`add`) and uncached (`factory`) resolvers
//! - Resolving values with `resolve()` (returns `Arc<T>`) and `resolve_cloned()` (returns `T`)
//! - Checking registration and cache status
//! - Handling missing keys and duplicate registrations
//!
//! Run with: `cargo run --example basic_usage`

use resolver_registry::define_registry;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Create an isolated registry for this example
define_registry!(app);

#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    name: String,
    version: u32,
    debug_mode: bool,
}

static REQUESTS: AtomicU32 = AtomicU32::new(0);

fn main() {
    println!("=== resolver-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Register resolvers (nothing runs yet)
    // -------------------------------------------------------------------------
    println!("1. Registering resolvers...");

    app::add("config", |_, _| {
        println!("   [factory] building AppConfig");
        Ok(AppConfig {
            name: "MyApp".to_string(),
            version: 1,
            debug_mode: true,
        })
    })
    .unwrap();

    app::factory("request_id", |_, _| {
        Ok(REQUESTS.fetch_add(1, Ordering::SeqCst) + 1)
    })
    .unwrap();

    println!("   Registered: config (cached), request_id (uncached)");

    // -------------------------------------------------------------------------
    // 2. Resolve a cached value twice
    // -------------------------------------------------------------------------
    println!("\n2. Resolving the cached config twice...");

    let first: Arc<AppConfig> = app::resolve("config").unwrap();
    let second: Arc<AppConfig> = app::resolve("config").unwrap();
    println!("   {:?}", *first);
    println!("   same instance: {}", Arc::ptr_eq(&first, &second));

    // -------------------------------------------------------------------------
    // 3. Resolve an uncached value repeatedly
    // -------------------------------------------------------------------------
    println!("\n3. Resolving the uncached request_id three times...");

    for _ in 0..3 {
        let id: Arc<u32> = app::resolve("request_id").unwrap();
        println!("   request_id = {}", *id);
    }

    // -------------------------------------------------------------------------
    // 4. Status checks
    // -------------------------------------------------------------------------
    println!("\n4. Checking status...");

    println!("   contains(\"config\")      = {}", app::contains("config"));
    println!("   is_cached(\"config\")     = {}", app::is_cached("config"));
    println!("   is_cached(\"request_id\") = {}", app::is_cached("request_id"));
    println!("   contains(\"logger\")      = {}", app::contains("logger"));

    // -------------------------------------------------------------------------
    // 5. Owned copies
    // -------------------------------------------------------------------------
    println!("\n5. Resolving an owned copy with resolve_cloned() -> T...");

    let owned: AppConfig = app::resolve_cloned("config").unwrap();
    println!("   {} v{} (debug: {})", owned.name, owned.version, owned.debug_mode);

    // -------------------------------------------------------------------------
    // 6. Errors
    // -------------------------------------------------------------------------
    println!("\n6. Handling errors...");

    match app::resolve::<String>("logger") {
        Ok(value) => println!("   Found logger: {}", value),
        Err(e) => println!("   Error (expected): {}", e),
    }

    if let Err(e) = app::add("config", |_, _| Ok(0u8)) {
        println!("   Error (expected): {}", e);
    }

    println!("\n=== Example Complete ===");
}
