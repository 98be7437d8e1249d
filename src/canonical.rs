//! Canonical (flyweight) instances keyed by their defining attributes.
//!
//! A [`CanonicalRegistry`] hands out one shared, immutable instance per distinct
//! key. The value is built by [`Intrinsic::from_key`], which can only read the
//! key itself, so equal keys always describe equal values.
//!
//! Callers keep their own per-use data (positions, sizes, ...) next to the
//! returned `Arc` and pass it in when the shared instance needs it.
//!
//! # Examples
//!
//! ```
//! use lazy_registry::{CanonicalRegistry, Intrinsic};
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! struct GlyphKey {
//!     ch: char,
//!     font: &'static str,
//! }
//!
//! struct Glyph {
//!     ch: char,
//!     font: &'static str,
//! }
//!
//! impl Intrinsic for Glyph {
//!     type Key = GlyphKey;
//!
//!     fn from_key(key: &GlyphKey) -> Self {
//!         Glyph { ch: key.ch, font: key.font }
//!     }
//! }
//!
//! let glyphs: CanonicalRegistry<Glyph> = CanonicalRegistry::new();
//! let a = glyphs.get_or_create(GlyphKey { ch: 'a', font: "mono" });
//! let b = glyphs.get_or_create(GlyphKey { ch: 'a', font: "mono" });
//!
//! assert!(CanonicalRegistry::<Glyph>::shares(&a, &b));
//! assert_eq!(glyphs.len(), 1);
//! ```

use std::{borrow::Borrow, fmt, hash::Hash, sync::Arc};

use crate::{
    ConstructionPolicy, KeyedLazyRegistry, RegistryEvent, RegistryOptions, RegistryStats,
};

/// A value fully determined by its key.
pub trait Intrinsic: Sized {
    /// The attribute tuple that identifies an instance.
    type Key: Eq + Hash + Clone + fmt::Debug;

    /// Builds the instance described by `key`. Must not read any other state.
    fn from_key(key: &Self::Key) -> Self;
}

/// Deduplicates immutable instances of `V` by their key.
pub struct CanonicalRegistry<V: Intrinsic> {
    inner: KeyedLazyRegistry<V::Key, V>,
}

impl<V: Intrinsic> CanonicalRegistry<V> {
    /// Creates an empty registry using [`ConstructionPolicy::RaceTolerant`].
    pub fn new() -> Self {
        Self::with_options(
            RegistryOptions::new()
                .name("canonical")
                .policy(ConstructionPolicy::RaceTolerant),
        )
    }

    /// Creates an empty registry with explicit options.
    ///
    /// Use this to name the registry or to switch to
    /// [`ConstructionPolicy::Strict`] when `from_key` is expensive.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_registry::{CanonicalRegistry, ConstructionPolicy, Intrinsic, RegistryOptions};
    ///
    /// struct Tile(u8);
    ///
    /// impl Intrinsic for Tile {
    ///     type Key = u8;
    ///
    ///     fn from_key(key: &u8) -> Self {
    ///         Tile(*key)
    ///     }
    /// }
    ///
    /// let tiles: CanonicalRegistry<Tile> = CanonicalRegistry::with_options(
    ///     RegistryOptions::new().name("tiles").policy(ConstructionPolicy::Strict),
    /// );
    /// assert_eq!(tiles.get_or_create(3).0, 3);
    /// ```
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            inner: KeyedLazyRegistry::with_options(options),
        }
    }

    /// Returns the shared instance for `key`, creating it on first use.
    pub fn get_or_create(&self, key: V::Key) -> Arc<V> {
        self.inner.get_or_insert_with(key, V::from_key)
    }

    /// Returns the shared instance for `key` if one was already created.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.inner.get(key)
    }

    /// Whether an instance for `key` exists. Never creates one.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.inner.contains(key)
    }

    /// Whether two handles point at the same canonical instance.
    pub fn shares(a: &Arc<V>, b: &Arc<V>) -> bool {
        Arc::ptr_eq(a, b)
    }

    /// Number of distinct instances created.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no instance has been created yet.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Counters for this registry; `constructions` is the number of
    /// `from_key` calls that were kept.
    pub fn stats(&self) -> RegistryStats {
        self.inner.stats()
    }

    /// See [`KeyedLazyRegistry::set_trace_callback`].
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent<'_>) + Send + Sync + 'static) {
        self.inner.set_trace_callback(callback);
    }

    /// Stops reporting events.
    pub fn clear_trace_callback(&self) {
        self.inner.clear_trace_callback();
    }
}

impl<V: Intrinsic> Default for CanonicalRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Intrinsic> fmt::Debug for CanonicalRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CanonicalRegistry").field(&self.inner).finish()
    }
}
