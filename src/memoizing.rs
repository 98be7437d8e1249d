//! Caching proxy in front of an expensive operation.
//!
//! [`MemoizingCache`] wraps a "real" [`Operation`] and runs it at most once per
//! request key. It implements [`Operation`] itself, so it can stand in wherever
//! the real operation is expected.
//!
//! # Examples
//!
//! ```
//! use lazy_registry::{MemoizingCache, Operation};
//! use std::convert::Infallible;
//!
//! struct Square;
//!
//! impl Operation for Square {
//!     type Request = u64;
//!     type Key = u64;
//!     type Output = u64;
//!     type Error = Infallible;
//!
//!     fn key(&self, request: &u64) -> u64 {
//!         *request
//!     }
//!
//!     fn perform(&self, request: &u64) -> Result<u64, Infallible> {
//!         Ok(request * request)
//!     }
//! }
//!
//! let cache = MemoizingCache::new(Square);
//! assert_eq!(*cache.get(&12).unwrap(), 144);
//! assert_eq!(*cache.get(&12).unwrap(), 144);
//! assert_eq!(cache.stats().constructions, 1);
//! ```

use std::{fmt, hash::Hash, sync::Arc};

use crate::{KeyedLazyRegistry, RegistryEvent, RegistryOptions, RegistryStats};

/// An expensive or side-effecting operation whose result can be reused.
///
/// The cache never looks inside `Output`; it only stores and returns it.
pub trait Operation {
    type Request: ?Sized;
    /// Identifies requests that produce the same output.
    type Key: Eq + Hash + Clone + fmt::Debug;
    type Output;
    type Error;

    fn key(&self, request: &Self::Request) -> Self::Key;

    fn perform(&self, request: &Self::Request) -> Result<Self::Output, Self::Error>;
}

/// Memoizes the results of `O`, one construction per distinct key.
pub struct MemoizingCache<O: Operation> {
    real: O,
    results: KeyedLazyRegistry<O::Key, O::Output>,
}

impl<O: Operation> MemoizingCache<O> {
    /// Wraps `real` using the strict policy, so `perform` never repeats for a key.
    pub fn new(real: O) -> Self {
        Self::with_options(real, RegistryOptions::new().name("memoizing"))
    }

    /// Wraps `real` with explicit options.
    ///
    /// [`ConstructionPolicy::RaceTolerant`](crate::ConstructionPolicy::RaceTolerant)
    /// lets concurrent misses each call `perform`; only pick it when that is harmless.
    pub fn with_options(real: O, options: RegistryOptions) -> Self {
        Self {
            real,
            results: KeyedLazyRegistry::with_options(options),
        }
    }

    /// Returns the cached output for `request`, performing it on a miss.
    ///
    /// # Errors
    ///
    /// Whatever `perform` returns. Failed requests are not cached.
    pub fn get(&self, request: &O::Request) -> Result<Arc<O::Output>, O::Error> {
        let key = self.real.key(request);
        self.results
            .get_or_try_insert_with(key, |_| self.real.perform(request))
    }

    /// Whether an output for `request` is cached. Never calls `perform`.
    pub fn contains(&self, request: &O::Request) -> bool {
        self.results.contains(&self.real.key(request))
    }

    /// Forgets the cached output for `request`, returning whether one existed.
    pub fn invalidate(&self, request: &O::Request) -> bool {
        self.results.invalidate(&self.real.key(request))
    }

    /// Forgets every cached output. Outputs already returned stay valid.
    pub fn clear(&self) {
        self.results.clear();
    }

    /// The wrapped operation.
    pub fn real(&self) -> &O {
        &self.real
    }

    /// Number of cached outputs.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Counters for the cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_registry::{MemoizingCache, Operation};
    ///
    /// struct Parse;
    ///
    /// impl Operation for Parse {
    ///     type Request = str;
    ///     type Key = String;
    ///     type Output = i64;
    ///     type Error = std::num::ParseIntError;
    ///
    ///     fn key(&self, text: &str) -> String {
    ///         text.trim().to_string()
    ///     }
    ///
    ///     fn perform(&self, text: &str) -> Result<i64, Self::Error> {
    ///         text.trim().parse()
    ///     }
    /// }
    ///
    /// let cache = MemoizingCache::new(Parse);
    /// assert!(cache.get("x").is_err());
    /// assert_eq!(*cache.get(" 7").unwrap(), 7);
    /// assert_eq!(*cache.get("7 ").unwrap(), 7);
    ///
    /// let stats = cache.stats();
    /// assert_eq!((stats.hits, stats.misses, stats.failures), (1, 2, 1));
    /// ```
    pub fn stats(&self) -> RegistryStats {
        self.results.stats()
    }

    /// Reports every lookup on the cached results to `callback`.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent<'_>) + Send + Sync + 'static) {
        self.results.set_trace_callback(callback);
    }

    /// Stops reporting events.
    pub fn clear_trace_callback(&self) {
        self.results.clear_trace_callback();
    }
}

impl<O: Operation> Operation for MemoizingCache<O> {
    type Request = O::Request;
    type Key = O::Key;
    type Output = Arc<O::Output>;
    type Error = O::Error;

    fn key(&self, request: &Self::Request) -> Self::Key {
        self.real.key(request)
    }

    fn perform(&self, request: &Self::Request) -> Result<Self::Output, Self::Error> {
        self.get(request)
    }
}

impl<O: Operation + fmt::Debug> fmt::Debug for MemoizingCache<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizingCache")
            .field("real", &self.real)
            .field("results", &self.results)
            .finish()
    }
}
