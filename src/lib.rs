//! # Lazy Registry
//!
//! Thread-safe keyed registries that construct each value at most once and share
//! it with every later caller.
//!
//! One primitive, [`KeyedLazyRegistry`], backs two specializations:
//!
//! - [`CanonicalRegistry`] - one shared immutable instance per distinct attribute
//!   key (flyweight)
//! - [`MemoizingCache`] - a proxy that runs an expensive [`Operation`] at most once
//!   per request key
//!
//! Registries are plain values. Construct them at startup and pass them to
//! whoever needs lookups; there is no global state.
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_registry::KeyedLazyRegistry;
//! use std::sync::Arc;
//!
//! let registry: KeyedLazyRegistry<&str, String> = KeyedLazyRegistry::new();
//!
//! let tree = registry.get_or_insert_with("Oak-Green-Rough", |key| key.replace('-', " "));
//! let again = registry.get_or_insert_with("Oak-Green-Rough", |_| unreachable!());
//!
//! assert!(Arc::ptr_eq(&tree, &again));
//! assert_eq!(&*tree, "Oak Green Rough");
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: hits take a shared read lock only
//! - **Two construction policies**: strict single construction or race-tolerant
//!   first-writer-wins, see [`ConstructionPolicy`]
//! - **Failure is not cached**: a failed or panicking factory leaves the key absent
//! - **Tracing support**: per-instance callback receiving [`RegistryEvent`]s, plus
//!   `tracing` records tagged with the registry name
//! - **Statistics**: hit/miss/construction counters via [`RegistryStats`]
//!
//! ## Main Types
//!
//! - [`KeyedLazyRegistry::get_or_try_insert_with`] - look up or construct a value
//! - [`CanonicalRegistry::get_or_create`] - canonical instance for a key
//! - [`MemoizingCache::get`] - cached result of an operation
//! - [`KeyedLazyRegistry::invalidate`] - drop one key so it is rebuilt on next use

mod canonical;
mod memoizing;
mod registry;
mod registry_error;
mod registry_event;
mod registry_options;
mod registry_stats;

pub use canonical::{CanonicalRegistry, Intrinsic};
pub use memoizing::{MemoizingCache, Operation};
pub use registry::KeyedLazyRegistry;
pub use registry_error::RegistryError;
pub use registry_event::{RegistryEvent, TraceCallback};
pub use registry_options::{ConstructionPolicy, RegistryOptions};
pub use registry_stats::RegistryStats;
