//! Integration tests for registry isolation.
//!
//! Registries are plain values: every instance owns its own table, so separate
//! instances never see each other's entries and tests can always start fresh.

use lazy_registry::{ConstructionPolicy, KeyedLazyRegistry, RegistryError, RegistryOptions};
use std::sync::Arc;

#[test]
fn test_multiple_isolated_registries() {
    let database: KeyedLazyRegistry<&str, String> = KeyedLazyRegistry::new();
    let cache: KeyedLazyRegistry<&str, String> = KeyedLazyRegistry::new();

    database.get_or_insert_with("url", |_| "postgresql://localhost".to_string());
    cache.get_or_insert_with("url", |_| "redis://localhost".to_string());

    assert_eq!(&*database.get("url").unwrap(), "postgresql://localhost");
    assert_eq!(&*cache.get("url").unwrap(), "redis://localhost");
}

#[test]
fn test_registry_does_not_leak_between_instances() {
    let isolated_a: KeyedLazyRegistry<u32, u32> = KeyedLazyRegistry::new();
    let isolated_b: KeyedLazyRegistry<u32, u32> = KeyedLazyRegistry::new();

    isolated_a.get_or_insert_with(1, |_| 100);

    assert!(isolated_a.contains(&1));
    assert!(!isolated_b.contains(&1));
    assert!(matches!(
        isolated_b.try_get(&1),
        Err(RegistryError::KeyNotFound { .. })
    ));
}

#[test]
fn test_same_key_constructs_once_per_registry() {
    let reg_a: KeyedLazyRegistry<&str, Vec<u8>> = KeyedLazyRegistry::new();
    let reg_b: KeyedLazyRegistry<&str, Vec<u8>> = KeyedLazyRegistry::new();

    let a = reg_a.get_or_insert_with("k", |_| vec![1]);
    let b = reg_b.get_or_insert_with("k", |_| vec![2]);

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!((a[0], b[0]), (1, 2));
    assert_eq!(reg_a.stats().constructions, 1);
    assert_eq!(reg_b.stats().constructions, 1);
}

#[test]
fn test_clearing_one_registry_leaves_others() {
    let keep: KeyedLazyRegistry<u8, u8> = KeyedLazyRegistry::new();
    let wipe: KeyedLazyRegistry<u8, u8> = KeyedLazyRegistry::new();

    keep.get_or_insert_with(1, |_| 1);
    wipe.get_or_insert_with(1, |_| 1);
    wipe.clear();

    assert!(keep.contains(&1));
    assert!(wipe.is_empty());
}

#[test]
fn test_options_are_per_instance() {
    let strict: KeyedLazyRegistry<u8, u8> = KeyedLazyRegistry::new();
    let racing: KeyedLazyRegistry<u8, u8> = KeyedLazyRegistry::with_options(
        RegistryOptions::new()
            .name("racing")
            .policy(ConstructionPolicy::RaceTolerant),
    );

    assert_eq!(strict.policy(), ConstructionPolicy::Strict);
    assert_eq!(strict.name(), "registry");
    assert_eq!(racing.policy(), ConstructionPolicy::RaceTolerant);
    assert_eq!(racing.name(), "racing");
}

#[test]
fn test_trace_callbacks_are_per_instance() {
    let traced: KeyedLazyRegistry<u8, u8> = KeyedLazyRegistry::new();
    let silent: KeyedLazyRegistry<u8, u8> = KeyedLazyRegistry::new();

    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    traced.get_or_insert_with(1, |_| 1);
    silent.get_or_insert_with(1, |_| 1);

    assert_eq!(events.lock().unwrap().len(), 2);
}
