use std::fmt;

/// Events emitted by a registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The key is borrowed for the duration of the callback and rendered with `Debug`.
///
/// # Examples
///
/// ```rust
/// use lazy_registry::RegistryEvent;
///
/// let key = "Oak-Green-Rough";
/// let event = RegistryEvent::Hit { key: &key };
/// assert_eq!(event.to_string(), r#"hit { key: "Oak-Green-Rough" }"#);
/// ```
#[derive(Debug, Clone)]
pub enum RegistryEvent<'a> {
    /// A lookup found a value already present.
    Hit { key: &'a dyn fmt::Debug },

    /// A lookup found no value; a factory is about to run.
    Miss { key: &'a dyn fmt::Debug },

    /// A factory succeeded and its value was published under the key.
    Construct { key: &'a dyn fmt::Debug },

    /// A factory failed; the key stays absent.
    ConstructFailed { key: &'a dyn fmt::Debug },

    /// A concurrently constructed value lost the race and was dropped.
    Discard { key: &'a dyn fmt::Debug },

    /// A value was requested without a factory.
    Get {
        key: &'a dyn fmt::Debug,
        /// Whether a value is present for the key
        found: bool,
    },

    /// A key existence check was performed.
    Contains {
        key: &'a dyn fmt::Debug,
        /// Whether a value is present for the key
        found: bool,
    },

    /// A key was invalidated.
    Invalidate {
        key: &'a dyn fmt::Debug,
        /// Whether a value was removed
        found: bool,
    },

    /// The registry was cleared.
    Clear {},
}

impl fmt::Display for RegistryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Hit { key } => write!(f, "hit {{ key: {key:?} }}"),
            RegistryEvent::Miss { key } => write!(f, "miss {{ key: {key:?} }}"),
            RegistryEvent::Construct { key } => write!(f, "construct {{ key: {key:?} }}"),
            RegistryEvent::ConstructFailed { key } => {
                write!(f, "construct_failed {{ key: {key:?} }}")
            }
            RegistryEvent::Discard { key } => write!(f, "discard {{ key: {key:?} }}"),
            RegistryEvent::Get { key, found } => {
                write!(f, "get {{ key: {key:?}, found: {found} }}")
            }
            RegistryEvent::Contains { key, found } => {
                write!(f, "contains {{ key: {key:?}, found: {found} }}")
            }
            RegistryEvent::Invalidate { key, found } => {
                write!(f, "invalidate {{ key: {key:?}, found: {found} }}")
            }
            RegistryEvent::Clear {} => write!(f, "Clearing the Registry"),
        }
    }
}

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because registries are shared across threads.
pub type TraceCallback = dyn Fn(&RegistryEvent<'_>) + Send + Sync + 'static;
