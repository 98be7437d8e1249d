//! Per-instance registry configuration.

use std::borrow::Cow;
use std::fmt;

/// How a registry handles concurrent misses for the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructionPolicy {
    /// Exactly one caller runs the factory for a missing key. Other callers for
    /// that key block until it finishes and then observe the same value.
    ///
    /// If the running factory fails or panics, the key stays absent and one of
    /// the waiting callers runs its own factory next.
    #[default]
    Strict,

    /// Callers may run the factory concurrently for the same missing key. The
    /// first value published wins; later ones are dropped.
    ///
    /// Only suitable for pure, cheap factories.
    RaceTolerant,
}

impl fmt::Display for ConstructionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionPolicy::Strict => write!(f, "strict"),
            ConstructionPolicy::RaceTolerant => write!(f, "race-tolerant"),
        }
    }
}

/// Options used when constructing a registry.
///
/// # Examples
///
/// ```rust
/// use lazy_registry::{ConstructionPolicy, KeyedLazyRegistry, RegistryOptions};
///
/// let options = RegistryOptions::new()
///     .name("tree-types")
///     .policy(ConstructionPolicy::RaceTolerant);
///
/// let registry: KeyedLazyRegistry<String, u32> = KeyedLazyRegistry::with_options(options);
/// assert_eq!(registry.name(), "tree-types");
/// assert_eq!(registry.policy(), ConstructionPolicy::RaceTolerant);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub(crate) name: Cow<'static, str>,
    pub(crate) policy: ConstructionPolicy,
}

impl RegistryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name attached to every log record the registry emits.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn policy(mut self, policy: ConstructionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("registry"),
            policy: ConstructionPolicy::default(),
        }
    }
}
