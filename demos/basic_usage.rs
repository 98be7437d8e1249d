//! Basic usage example for lazy-registry.
//!
//! Demonstrates:
//! - Constructing values on first use with `get_or_insert_with()`
//! - Failing factories that leave the key absent with `get_or_try_insert_with()`
//! - Peeking without constructing via `get()` and `contains()`
//! - Watching registry activity with a trace callback and `tracing`
//!
//! Run with: `cargo run --example basic_usage`

use lazy_registry::{KeyedLazyRegistry, RegistryOptions};
use std::sync::Arc;

#[derive(Debug)]
struct AppConfig {
    name: String,
    version: u32,
    debug_mode: bool,
}

fn load_config(profile: &str) -> Result<AppConfig, String> {
    match profile {
        "dev" => Ok(AppConfig {
            name: "MyApp".to_string(),
            version: 1,
            debug_mode: true,
        }),
        "prod" => Ok(AppConfig {
            name: "MyApp".to_string(),
            version: 1,
            debug_mode: false,
        }),
        other => Err(format!("unknown profile `{other}`")),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazy_registry=debug".into()),
        )
        .init();

    println!("=== lazy-registry: Basic Usage ===\n");

    let configs: KeyedLazyRegistry<String, AppConfig> =
        KeyedLazyRegistry::with_options(RegistryOptions::new().name("configs"));

    configs.set_trace_callback(|event| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. Construct on first use
    // -------------------------------------------------------------------------
    println!("1. Loading the dev profile twice...");

    let first = configs
        .get_or_try_insert_with("dev".to_string(), |p| load_config(p))
        .expect("dev profile exists");
    let second = configs
        .get_or_try_insert_with("dev".to_string(), |p| load_config(p))
        .expect("dev profile exists");

    println!("   Same instance: {}", Arc::ptr_eq(&first, &second));
    println!(
        "   {} v{} (debug: {})",
        first.name, first.version, first.debug_mode
    );

    // -------------------------------------------------------------------------
    // 2. Failures are not cached
    // -------------------------------------------------------------------------
    println!("\n2. Loading an unknown profile...");

    match configs.get_or_try_insert_with("staging".to_string(), |p| load_config(p)) {
        Ok(config) => println!("   Unexpected: {config:?}"),
        Err(err) => println!("   Error: {err}"),
    }
    println!("   staging present: {}", configs.contains("staging"));

    // -------------------------------------------------------------------------
    // 3. Peek without constructing
    // -------------------------------------------------------------------------
    println!("\n3. Peeking...");

    println!("   prod loaded: {}", configs.get("prod").is_some());
    if let Err(err) = configs.try_get("prod") {
        println!("   try_get: {err}");
    }

    // -------------------------------------------------------------------------
    // 4. Statistics
    // -------------------------------------------------------------------------
    configs.clear_trace_callback();
    let stats = configs.stats();
    println!(
        "\n4. entries={} hits={} misses={} failures={} hit_rate={:.2}",
        stats.entries,
        stats.hits,
        stats.misses,
        stats.failures,
        stats.hit_rate()
    );

    println!("\n=== Example completed successfully! ===");
}
