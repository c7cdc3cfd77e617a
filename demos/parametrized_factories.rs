//! Parametrized factory example for resolver-registry.
//!
//! Demonstrates:
//! - Passing caller arguments to a factory with `resolve_with()` and `Args`
//! - Combining arguments with resolved dependencies
//! - Cached resolvers ignoring arguments after their first resolution
//!
//! Run with: `cargo run --example parametrized_factories`

use resolver_registry::{Args, Registry};
use std::sync::Arc;

#[derive(Debug)]
struct Connection {
    host: String,
    port: u16,
    timeout_ms: u64,
}

fn main() {
    println!("=== resolver-registry: Parametrized Factories ===\n");

    let registry = Registry::new();

    registry.add("timeout_ms", |_, _| Ok(2_500u64)).unwrap();
    registry
        .factory("connection", |r, args| {
            let timeout: Arc<u64> = r.resolve("timeout_ms")?;
            Ok(Connection {
                host: args.get::<String>(0)?.clone(),
                port: *args.get::<u16>(1)?,
                timeout_ms: *timeout,
            })
        })
        .unwrap();

    // -------------------------------------------------------------------------
    // 1. One factory, different arguments
    // -------------------------------------------------------------------------
    println!("1. Opening connections...");

    for (host, port) in [("db.internal", 5432u16), ("cache.internal", 6379u16)] {
        let args = Args::new().with(host.to_string()).with(port);
        let conn: Arc<Connection> = registry.resolve_with("connection", &args).unwrap();
        println!("   {}:{} (timeout {}ms)", conn.host, conn.port, conn.timeout_ms);
    }

    // -------------------------------------------------------------------------
    // 2. Missing arguments
    // -------------------------------------------------------------------------
    println!("\n2. Forgetting the port...");

    let args = Args::new().with("db.internal".to_string());
    match registry.resolve_with::<Connection, _>("connection", &args) {
        Ok(conn) => println!("   unexpectedly connected: {:?}", conn),
        Err(e) => println!("   Error (expected): {}", e),
    }

    // -------------------------------------------------------------------------
    // 3. Cached resolvers only see the first arguments
    // -------------------------------------------------------------------------
    println!("\n3. Cached resolver with arguments...");

    registry
        .add("region", |_, args| Ok(args.get::<String>(0)?.clone()))
        .unwrap();
    let first: Arc<String> = registry
        .resolve_with("region", &Args::new().with("eu-west".to_string()))
        .unwrap();
    let second: Arc<String> = registry
        .resolve_with("region", &Args::new().with("us-east".to_string()))
        .unwrap();
    println!("   first: {first}, second: {second}");

    println!("\n=== Example Complete ===");
}
