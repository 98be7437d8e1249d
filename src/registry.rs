//! A thread-safe keyed registry that constructs each value at most once.
//!
//! A lookup either returns the value already stored under its key or runs the
//! supplied factory, publishes the result and returns it. Every later lookup for
//! that key observes the same `Arc<V>` until the key is invalidated or the
//! registry is dropped.
//!
//! # Examples
//!
//! ```
//! use lazy_registry::KeyedLazyRegistry;
//! use std::sync::Arc;
//!
//! let registry: KeyedLazyRegistry<String, String> = KeyedLazyRegistry::new();
//!
//! let first = registry.get_or_insert_with("Oak".to_string(), |name| name.to_uppercase());
//! let second = registry.get_or_insert_with("Oak".to_string(), |_| unreachable!());
//!
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(&*first, "OAK");
//! ```

use std::{borrow::Borrow, cell::Cell, collections::HashMap, fmt, hash::Hash, sync::Arc};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::registry_stats::Counters;
use crate::{
    ConstructionPolicy, RegistryError, RegistryEvent, RegistryOptions, RegistryStats,
    TraceCallback,
};

/// A key's slot. Empty while the key is absent or under construction.
type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Keyed, lazily-populated, shared table.
///
/// See [`ConstructionPolicy`] for how concurrent misses on the same key behave.
/// No lock is held while a factory or a trace callback runs.
pub struct KeyedLazyRegistry<K, V> {
    table: RwLock<HashMap<K, Slot<V>>>,
    trace: RwLock<Option<Arc<TraceCallback>>>,
    counters: Counters,
    options: RegistryOptions,
}

impl<K, V> KeyedLazyRegistry<K, V> {
    /// Creates an empty registry with the default options (strict policy).
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Creates an empty registry with the given name and policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_registry::{ConstructionPolicy, KeyedLazyRegistry, RegistryOptions};
    ///
    /// let registry: KeyedLazyRegistry<u32, String> = KeyedLazyRegistry::with_options(
    ///     RegistryOptions::new()
    ///         .name("thumbnails")
    ///         .policy(ConstructionPolicy::RaceTolerant),
    /// );
    ///
    /// assert_eq!(registry.name(), "thumbnails");
    /// assert_eq!(registry.policy(), ConstructionPolicy::RaceTolerant);
    /// ```
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            trace: RwLock::new(None),
            counters: Counters::default(),
            options,
        }
    }

    /// Name used in log records and lookup errors.
    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// How concurrent misses on one key are resolved.
    pub fn policy(&self) -> ConstructionPolicy {
        self.options.policy
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked for every lookup, construction, invalidation and
    /// clear. It runs without any registry lock held, except that under the
    /// strict policy construction events for a key fire while other callers for
    /// that same key are waiting.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent<'_>) + Send + Sync + 'static) {
        *self.trace.write() = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    ///
    /// Stored values are not affected.
    pub fn clear_trace_callback(&self) {
        *self.trace.write() = None;
    }

    fn emit_event(&self, event: &RegistryEvent<'_>) {
        let callback = self.trace.read().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl<K, V> KeyedLazyRegistry<K, V>
where
    K: Eq + Hash + fmt::Debug,
{
    // -------------------------------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------------------------------

    /// Returns the value for `key`, running `factory` if the key is absent.
    ///
    /// A factory error is returned unchanged and nothing is stored, so the next
    /// call for the same key runs a factory again. A panicking factory likewise
    /// leaves the key absent.
    ///
    /// Under the strict policy the factory must not look up its own key in this
    /// registry; that call would wait on itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_registry::KeyedLazyRegistry;
    ///
    /// let registry: KeyedLazyRegistry<&str, u32> = KeyedLazyRegistry::new();
    ///
    /// let failed: Result<_, String> = registry.get_or_try_insert_with("X", |_| Err("offline".into()));
    /// assert_eq!(failed.unwrap_err(), "offline");
    /// assert!(!registry.contains("X"));
    ///
    /// let value = registry.get_or_try_insert_with("X", |_| Ok::<_, String>(7)).unwrap();
    /// assert_eq!(*value, 7);
    /// ```
    pub fn get_or_try_insert_with<E, F>(&self, key: K, factory: F) -> Result<Arc<V>, E>
    where
        K: Clone,
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.present(&key) {
            self.record_hit(&key);
            return Ok(value);
        }

        match self.options.policy {
            ConstructionPolicy::Strict => self.construct_strict(key, factory),
            ConstructionPolicy::RaceTolerant => self.construct_racing(key, factory),
        }
    }

    /// Infallible form of [`get_or_try_insert_with`](Self::get_or_try_insert_with).
    pub fn get_or_insert_with<F>(&self, key: K, factory: F) -> Arc<V>
    where
        K: Clone,
        F: FnOnce(&K) -> V,
    {
        match self.get_or_try_insert_with(key, |k| Ok::<V, std::convert::Infallible>(factory(k))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    fn construct_strict<E, F>(&self, key: K, factory: F) -> Result<Arc<V>, E>
    where
        K: Clone,
        F: FnOnce(&K) -> Result<V, E>,
    {
        let guard = FactoryGuard::new(self, &key, self.slot_for(&key));
        let mut constructed = false;

        // Concurrent callers for this key block here until one initializer succeeds.
        let result = guard.slot.get_or_try_init(|| {
            constructed = true;
            self.record_miss(&key);
            guard.run(|| factory(&key)).map(Arc::new)
        });

        match result {
            Ok(value) if constructed => {
                self.record_construct(&key);
                Ok(Arc::clone(value))
            }
            Ok(value) => {
                self.record_hit(&key);
                Ok(Arc::clone(value))
            }
            Err(err) => {
                self.record_failure(&key);
                Err(err)
            }
        }
    }

    fn construct_racing<E, F>(&self, key: K, factory: F) -> Result<Arc<V>, E>
    where
        K: Clone,
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.record_miss(&key);

        // The factory runs unsynchronized; the slot only arbitrates publication.
        let guard = FactoryGuard::new(self, &key, self.slot_for(&key));
        let value = match guard.run(|| factory(&key)) {
            Ok(value) => Arc::new(value),
            Err(err) => {
                self.record_failure(&key);
                return Err(err);
            }
        };

        let outcome = guard.slot.try_insert(value);
        match outcome {
            Ok(published) => {
                self.record_construct(&key);
                Ok(Arc::clone(published))
            }
            Err((winner, _discarded)) => {
                Counters::bump(&self.counters.discarded);
                tracing::debug!(registry = %self.options.name, key = ?key, "discarded losing construction");
                self.emit_event(&RegistryEvent::Discard { key: &key });
                Ok(Arc::clone(winner))
            }
        }
    }

    /// Returns the slot for `key`, inserting an empty one if needed.
    fn slot_for(&self, key: &K) -> Slot<V>
    where
        K: Clone,
    {
        if let Some(slot) = self.table.read().get(key) {
            return Arc::clone(slot);
        }

        let mut table = self.table.write();
        Arc::clone(table.entry(key.clone()).or_default())
    }

    /// Drops our handle on an empty slot and removes it from the table if no
    /// other caller still holds one.
    ///
    /// Handles on a slot are only cloned under the table lock and empty ones are
    /// only released here, so the last caller to leave sees a count of one.
    fn release_slot(&self, key: &K, slot: Slot<V>) {
        let mut table = self.table.write();
        let ours = table
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, &slot) && current.get().is_none());
        drop(slot);

        if ours && table.get(key).is_some_and(|current| Arc::strong_count(current) == 1) {
            table.remove(key);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    /// Returns the value for `key` if it is present. Never runs a factory.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let value = self.present(key);
        self.emit_event(&RegistryEvent::Get {
            key: &key,
            found: value.is_some(),
        });
        value
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::KeyNotFound`] if no value is present for `key`
    pub fn try_get<Q>(&self, key: &Q) -> Result<Arc<V>, RegistryError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.get(key).ok_or_else(|| RegistryError::KeyNotFound {
            registry: self.options.name.to_string(),
            key: format!("{key:?}"),
        })
    }

    /// Check if a value is present for `key`.
    ///
    /// Keys whose construction is in progress or has failed are not present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let found = self.present(key).is_some();
        self.emit_event(&RegistryEvent::Contains { key: &key, found });
        found
    }

    /// Number of keys with a present value.
    ///
    /// Keys under construction are not counted.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Whether no key has a present value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the lookup counters and the current entry count.
    ///
    /// Counters survive [`clear`](Self::clear) and [`invalidate`](Self::invalidate).
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_registry::KeyedLazyRegistry;
    ///
    /// let registry: KeyedLazyRegistry<&str, usize> = KeyedLazyRegistry::new();
    /// registry.get_or_insert_with("a", |k| k.len());
    /// registry.get_or_insert_with("a", |k| k.len());
    ///
    /// let stats = registry.stats();
    /// assert_eq!((stats.entries, stats.hits, stats.misses), (1, 1, 1));
    /// assert_eq!(stats.hit_rate(), 0.5);
    /// ```
    pub fn stats(&self) -> RegistryStats {
        self.counters.snapshot(self.len())
    }

    fn present<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table
            .read()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    // -------------------------------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------------------------------

    /// Removes the value for `key`, returning whether one was present.
    ///
    /// Values already handed out stay valid; the next lookup constructs anew.
    /// A key still under construction is left alone and `false` is returned.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let found = {
            let mut table = self.table.write();
            let populated = table.get(key).is_some_and(|slot| slot.get().is_some());
            if populated {
                table.remove(key);
            }
            populated
        };

        tracing::debug!(registry = %self.options.name, key = ?key, found, "invalidated key");
        self.emit_event(&RegistryEvent::Invalidate { key: &key, found });
        found
    }

    /// Removes every value from the registry.
    ///
    /// Does NOT affect already-retrieved `Arc<V>` handles, the statistics
    /// counters, or the tracing callback. Keys still under construction keep
    /// their slot so their waiters share one result.
    pub fn clear(&self) {
        self.emit_event(&RegistryEvent::Clear {});
        self.table.write().retain(|_, slot| slot.get().is_none());
        tracing::debug!(registry = %self.options.name, "cleared registry");
    }

    // -------------------------------------------------------------------------------------------------
    // Bookkeeping
    // -------------------------------------------------------------------------------------------------

    fn record_hit(&self, key: &K) {
        Counters::bump(&self.counters.hits);
        tracing::trace!(registry = %self.options.name, key = ?key, "hit");
        self.emit_event(&RegistryEvent::Hit { key });
    }

    fn record_miss(&self, key: &K) {
        Counters::bump(&self.counters.misses);
        tracing::trace!(registry = %self.options.name, key = ?key, "miss");
        self.emit_event(&RegistryEvent::Miss { key });
    }

    fn record_construct(&self, key: &K) {
        Counters::bump(&self.counters.constructions);
        tracing::debug!(registry = %self.options.name, key = ?key, "constructed value");
        self.emit_event(&RegistryEvent::Construct { key });
    }

    fn record_failure(&self, key: &K) {
        Counters::bump(&self.counters.failures);
        tracing::warn!(registry = %self.options.name, key = ?key, "factory failed, key left absent");
        self.emit_event(&RegistryEvent::ConstructFailed { key });
    }
}

/// One caller's handle on a slot while its factory may run.
///
/// Dropping the guard, on return or while unwinding, counts a panicking factory
/// as a failure and hands a still-empty slot back to the table.
struct FactoryGuard<'r, K: Eq + Hash + fmt::Debug, V> {
    registry: &'r KeyedLazyRegistry<K, V>,
    key: &'r K,
    slot: Slot<V>,
    running: Cell<bool>,
}

impl<'r, K: Eq + Hash + fmt::Debug, V> FactoryGuard<'r, K, V> {
    fn new(registry: &'r KeyedLazyRegistry<K, V>, key: &'r K, slot: Slot<V>) -> Self {
        Self {
            registry,
            key,
            slot,
            running: Cell::new(false),
        }
    }

    fn run<T>(&self, factory: impl FnOnce() -> T) -> T {
        self.running.set(true);
        let built = factory();
        self.running.set(false);
        built
    }
}

impl<K: Eq + Hash + fmt::Debug, V> Drop for FactoryGuard<'_, K, V> {
    fn drop(&mut self) {
        if self.running.get() {
            self.registry.record_failure(self.key);
        }
        if self.slot.get().is_none() {
            let slot = std::mem::take(&mut self.slot);
            self.registry.release_slot(self.key, slot);
        }
    }
}

impl<K, V> Default for KeyedLazyRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for KeyedLazyRegistry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLazyRegistry")
            .field("name", &self.options.name)
            .field("policy", &self.options.policy)
            .field("slots", &self.table.read().len())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
