//! Transparent-call adapter over the registry.
//!
//! [`ResidentFn`] wraps a constructor so that every call site routes through
//! a registry: the wrapped function is registered once, at construction, and
//! each [`call`](ResidentFn::call) becomes a `get` with the arguments
//! forwarded unchanged.

use std::sync::Arc;

use crate::{
    BoxError, Registry, RegistryError, ResidentObject, ToFingerprint,
};

/// Wrap a typed teardown hook into the registry's type-erased form.
///
/// The returned hook downcasts the evicted instance to `T` before invoking
/// `teardown`; a downcast failure (some other type lived under the key,
/// which means a key collision) is reported as a teardown error.
pub fn typed_teardown<T>(
    teardown: impl Fn(Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
) -> impl Fn(ResidentObject) -> Result<(), BoxError> + Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    move |instance: ResidentObject| match instance.downcast::<T>() {
        Ok(typed) => teardown(typed),
        Err(_) => Err(format!(
            "teardown hook expected a {}",
            std::any::type_name::<T>()
        )
        .into()),
    }
}

/// A constructor wrapped to route through a registry.
///
/// Calling it behaves like calling the constructor directly, except that the
/// result is cached under exclusive residency: repeated calls with equal
/// arguments return the resident instance, and any other call through the
/// same registry evicts it first.
///
/// # Examples
///
/// ```
/// use resident_registry::{Registry, ResidentFn};
///
/// let registry = Registry::new();
/// let embed = ResidentFn::in_registry(registry, "embedder", |dim: &(i64,)| {
///     Ok(vec![0.0f32; dim.0 as usize])
/// });
///
/// let a = embed.call((8,)).unwrap();
/// let b = embed.call((8,)).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
pub struct ResidentFn<A, T> {
    registry: Registry,
    key: String,
    build: Box<dyn Fn(&A) -> Result<T, BoxError> + Send + Sync>,
}

impl<A, T> ResidentFn<A, T>
where
    A: ToFingerprint,
    T: Send + Sync + 'static,
{
    /// Wrap `build` under `key` in the process-wide registry, with a no-op
    /// teardown hook.
    pub fn new(
        key: impl Into<String>,
        build: impl Fn(&A) -> Result<T, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self::in_registry(Registry::global(), key, build)
    }

    /// Wrap `build` under `key` in the process-wide registry, with a typed
    /// teardown hook.
    pub fn with_teardown(
        key: impl Into<String>,
        build: impl Fn(&A) -> Result<T, BoxError> + Send + Sync + 'static,
        teardown: impl Fn(Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self::in_registry_with_teardown(Registry::global(), key, build, teardown)
    }

    /// Wrap `build` under `key` in the given registry, with a no-op teardown
    /// hook. Registers the key immediately.
    pub fn in_registry(
        registry: Registry,
        key: impl Into<String>,
        build: impl Fn(&A) -> Result<T, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let key = key.into();
        registry.register(key.clone());
        ResidentFn {
            registry,
            key,
            build: Box::new(build),
        }
    }

    /// Wrap `build` under `key` in the given registry, with a typed teardown
    /// hook. Registers the key immediately.
    pub fn in_registry_with_teardown(
        registry: Registry,
        key: impl Into<String>,
        build: impl Fn(&A) -> Result<T, BoxError> + Send + Sync + 'static,
        teardown: impl Fn(Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        let key = key.into();
        registry.register_with_teardown(key.clone(), typed_teardown::<T>(teardown));
        ResidentFn {
            registry,
            key,
            build: Box::new(build),
        }
    }

    /// The key this wrapper was registered under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Call the wrapped constructor through the registry.
    ///
    /// Arguments are forwarded unchanged: they form the fingerprint for the
    /// hit test, and on a miss they are handed to the build closure.
    pub fn call(&self, args: A) -> Result<Arc<T>, RegistryError> {
        self.registry
            .get(&self.key, args.to_fingerprint(), || (self.build)(&args))
    }
}
