//! Service graph example for resolver-registry.
//!
//! Demonstrates:
//! - Factories resolving their own dependencies through the `Resolver`
//! - A shared dependency built once and reused by every dependent
//! - Cycle detection with the offending path, and the rest of the graph staying usable
//! - Observing resolution through the trace callback
//!
//! Run with: `cargo run --example service_graph`

use resolver_registry::{Registry, RegistryError};
use std::sync::Arc;

struct Config {
    database_url: String,
}

struct Database {
    url: String,
}

struct UserRepository {
    db: Arc<Database>,
}

struct AuditLog {
    db: Arc<Database>,
}

struct UserService {
    users: Arc<UserRepository>,
    audit: Arc<AuditLog>,
}

fn main() -> Result<(), RegistryError> {
    println!("=== resolver-registry: Service Graph ===\n");

    let registry = Registry::new();
    registry.set_trace_callback(|event| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. Wire the graph
    // -------------------------------------------------------------------------
    println!("1. Registering services...");

    registry.add("config", |_, _| {
        Ok(Config {
            database_url: "postgres://localhost/app".to_string(),
        })
    })?;
    registry.add("database", |r, _| {
        let config: Arc<Config> = r.resolve("config")?;
        Ok(Database {
            url: config.database_url.clone(),
        })
    })?;
    registry.add("users", |r, _| {
        Ok(UserRepository {
            db: r.resolve("database")?,
        })
    })?;
    registry.add("audit", |r, _| {
        Ok(AuditLog {
            db: r.resolve("database")?,
        })
    })?;
    registry.add("user_service", |r, _| {
        Ok(UserService {
            users: r.resolve("users")?,
            audit: r.resolve("audit")?,
        })
    })?;

    // -------------------------------------------------------------------------
    // 2. Resolve the root
    // -------------------------------------------------------------------------
    println!("\n2. Resolving user_service...");

    let service: Arc<UserService> = registry.resolve("user_service")?;
    println!("   database url: {}", service.users.db.url);
    println!(
        "   repository and audit log share one database: {}",
        Arc::ptr_eq(&service.users.db, &service.audit.db)
    );

    // -------------------------------------------------------------------------
    // 3. A cycle
    // -------------------------------------------------------------------------
    println!("\n3. Adding a circular pair and resolving it...");

    registry.add("session", |r, _| r.resolve::<(), _>("token").map(|_| ()))?;
    registry.add("token", |r, _| r.resolve::<(), _>("session").map(|_| ()))?;

    match registry.resolve::<(), _>("session") {
        Err(e) => println!("   Error (expected): {e}"),
        Ok(_) => println!("   unexpectedly resolved"),
    }

    // -------------------------------------------------------------------------
    // 4. The rest of the graph is unaffected
    // -------------------------------------------------------------------------
    println!("\n4. Resolving config after the failure...");

    let config: Arc<Config> = registry.resolve("config")?;
    println!("   config still resolves: {}", config.database_url);

    println!("\n=== Example Complete ===");
    Ok(())
}
