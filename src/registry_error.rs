use thiserror::Error;

/// Errors returned by the non-constructing accessors.
///
/// Factory failures are never wrapped: `get_or_try_insert_with` hands the
/// factory's own error back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("Key not found in registry `{registry}`: {key}")]
    KeyNotFound { registry: String, key: String },
}
