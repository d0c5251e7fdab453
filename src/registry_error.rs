use thiserror::Error;

/// Boundary type for failures raised by caller-supplied constructors and
/// teardown hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `get` was called with a key that was never registered.
    #[error("key not registered: {key}")]
    NotRegistered { key: String },

    /// The resident instance for the key is not the requested type.
    ///
    /// Reachable only when two call sites request different types under the
    /// same key, which usually means a key collision.
    #[error("resident instance for key {key} is not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },

    /// The constructor for the requested key failed.
    ///
    /// The previously resident instance (if any) was already torn down, so
    /// the registry holds no active instance after this error.
    #[error("construction for key {key} failed")]
    Construction {
        key: String,
        #[source]
        source: BoxError,
    },

    /// The teardown hook of the evicted instance failed.
    ///
    /// The evicted slot has already been emptied when this is returned: the
    /// instance is no longer trustworthy regardless of hook success, so the
    /// registry never keeps bookkeeping that points at it.
    #[error("teardown of evicted key {key} failed")]
    Teardown {
        key: String,
        #[source]
        source: BoxError,
    },
}
