//! Single-slot resource registry with exclusive-residency eviction.
//!
//! A [`Registry`] maps caller-chosen string keys to slots. Each slot can hold
//! one constructed instance, but across the whole registry at most one slot
//! is ever occupied: requesting a different key, or the same key with
//! different construction arguments, tears down the resident instance before
//! the new one is built.
//!
//! Intended for resources that are expensive both to construct and to hold,
//! such as a model loaded onto an accelerator, where the previous instance
//! must release its capacity before the next one can claim it.
//!
//! # Examples
//!
//! ```
//! use resident_registry::{fingerprint, Registry};
//!
//! let registry = Registry::new();
//! registry.register("greeting");
//!
//! let value = registry
//!     .get::<String, _, _>("greeting", fingerprint!("en"), || Ok("hello".to_string()))
//!     .unwrap();
//! assert_eq!(&*value, "hello");
//! ```

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::{BoxError, Fingerprint, RegistryError, RegistryEvent, ToFingerprint};

/// Type-erased resident instance, shared between the registry and callers.
///
/// The registry hands out clones of this `Arc`; a clone stays valid after
/// eviction, but the registry gives no way to extend residency itself.
pub type ResidentObject = Arc<dyn Any + Send + Sync>;

/// Teardown hook invoked with the instance being evicted.
///
/// Runs after the slot has already been emptied. An `Err` propagates from
/// the `get` call that triggered the eviction.
pub type TeardownFn = dyn Fn(ResidentObject) -> Result<(), BoxError> + Send + Sync;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a [`RegistryEvent`] for every registry operation.
/// It must be thread-safe because the registry is shared, and it must not
/// call back into the same registry: some events are emitted while the
/// registry lock is held, so re-entry deadlocks.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// One registered key: its teardown hook plus the (at most one) resident
/// instance and the fingerprint of the arguments that built it.
struct Slot {
    teardown: Arc<TeardownFn>,
    resident: Option<ResidentObject>,
    fingerprint: Option<Fingerprint>,
}

impl Slot {
    fn new(teardown: Arc<TeardownFn>) -> Self {
        Slot {
            teardown,
            resident: None,
            fingerprint: None,
        }
    }

    /// Empty the slot, then run the hook on whatever was resident.
    ///
    /// State is cleared before the hook runs, so a failing hook can never
    /// leave bookkeeping pointing at a torn-down instance.
    fn evict(&mut self) -> Result<(), BoxError> {
        self.fingerprint = None;
        match self.resident.take() {
            Some(instance) => (self.teardown)(instance),
            None => Ok(()),
        }
    }
}

struct Inner {
    slots: HashMap<String, Slot>,
    /// Key of the one slot holding a resident instance, if any.
    active: Option<String>,
}

struct RegistryShared {
    inner: Mutex<Inner>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

/// Handle to a single-slot resource registry.
///
/// Cloning is cheap and every clone observes the same shared state, so a
/// `Registry` can be passed around or injected freely. [`Registry::global`]
/// returns a handle to the lazily-created process-wide registry, which the
/// crate-level free functions also use.
///
/// All operations take one exclusive lock for their full duration, including
/// the caller-supplied constructor and teardown hook during `get`. That is
/// deliberate: at most one instance is ever live, and the lock is what keeps
/// concurrent callers from racing a teardown against a construction.
/// Constructors and hooks therefore must not call back into the same
/// registry.
///
/// # Examples
///
/// ```
/// use resident_registry::Registry;
///
/// let registry = Registry::new();
/// registry.register("encoder");
/// registry.register("decoder");
///
/// let enc = registry
///     .get::<Vec<u8>, _, _>("encoder", (16,), || Ok(vec![0u8; 16]))
///     .unwrap();
/// assert_eq!(enc.len(), 16);
/// assert_eq!(registry.active_key().as_deref(), Some("encoder"));
///
/// // Requesting the decoder evicts the encoder first.
/// let _dec = registry
///     .get::<Vec<u8>, _, _>("decoder", (4,), || Ok(vec![1u8; 4]))
///     .unwrap();
/// assert_eq!(registry.active_key().as_deref(), Some("decoder"));
/// ```
#[derive(Clone)]
pub struct Registry {
    shared: Arc<RegistryShared>,
}

/// Process-wide registry backing the crate-level free functions.
static GLOBAL_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

impl Registry {
    /// Create a new, empty registry with its own isolated state.
    pub fn new() -> Self {
        Registry {
            shared: Arc::new(RegistryShared {
                inner: Mutex::new(Inner {
                    slots: HashMap::new(),
                    active: None,
                }),
                trace: Mutex::new(None),
            }),
        }
    }

    /// Handle to the process-wide registry.
    ///
    /// Created lazily on first use; every call returns a handle to the same
    /// shared state.
    pub fn global() -> Registry {
        GLOBAL_REGISTRY.clone()
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        // Poisoning can only come from caller-supplied code panicking while
        // the lock was held; the bookkeeping is consistent at every such
        // point, so recover and continue.
        self.shared
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a key with a no-op teardown hook.
    ///
    /// Idempotent: registering a key that already exists changes nothing.
    /// No construction happens here; the instance is built by the first
    /// [`get`](Registry::get) for the key.
    pub fn register(&self, key: impl Into<String>) {
        self.register_with_teardown(key, |_| Ok(()));
    }

    /// Register a key with a teardown hook, invoked with the instance when
    /// it is evicted.
    ///
    /// Idempotent: re-registering an existing key keeps the original hook
    /// and does not touch the resident instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use resident_registry::Registry;
    ///
    /// let registry = Registry::new();
    /// registry.register_with_teardown("model", |instance| {
    ///     if let Ok(weights) = instance.downcast::<Vec<f32>>() {
    ///         println!("releasing {} weights", weights.len());
    ///     }
    ///     Ok(())
    /// });
    /// assert!(registry.contains("model"));
    /// ```
    pub fn register_with_teardown<F>(&self, key: impl Into<String>, teardown: F)
    where
        F: Fn(ResidentObject) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let key = key.into();
        let mut inner = self.lock_inner();
        let inserted = match inner.slots.entry(key.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(Slot::new(Arc::new(teardown)));
                true
            }
            // Re-registration keeps the original hook untouched
            Entry::Occupied(_) => false,
        };
        drop(inner);

        self.emit_event(&RegistryEvent::Register {
            key: key.clone(),
            inserted,
        });
        debug!(key = %key, inserted, "register");
    }

    /// Get the instance for `key`, constructing it if necessary.
    ///
    /// `args` is the canonical identity of the construction arguments (a
    /// tuple, a [`Fingerprint`], or anything implementing
    /// [`ToFingerprint`]); `build` is the constructor, invoked only on a
    /// cache miss.
    ///
    /// - If `key` is already active with an equal fingerprint, the resident
    ///   instance is returned unchanged: no construction, no teardown.
    /// - Otherwise the currently resident instance — whichever key owns it —
    ///   is torn down first, and only then is `build` invoked, so a
    ///   resource-constrained constructor can reuse the freed capacity.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if `key` was never registered;
    ///   registry state is untouched.
    /// - [`RegistryError::TypeMismatch`] if the resident instance is not a
    ///   `T` (two call sites disagree about the key's type).
    /// - [`RegistryError::Construction`] if `build` fails. The previous
    ///   instance is already gone, so nothing is active afterwards; a retry
    ///   constructs from scratch.
    /// - [`RegistryError::Teardown`] if the evicted instance's hook fails.
    ///   The evicted slot is already emptied; nothing is active afterwards.
    pub fn get<T, A, F>(&self, key: &str, args: A, build: F) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        A: ToFingerprint,
        F: FnOnce() -> Result<T, BoxError>,
    {
        let fingerprint = args.to_fingerprint();
        let mut inner = self.lock_inner();

        if !inner.slots.contains_key(key) {
            return Err(RegistryError::NotRegistered {
                key: key.to_string(),
            });
        }

        // Hit: the key is already active and was built from equal arguments.
        if inner.active.as_deref() == Some(key) {
            if let Some(slot) = inner.slots.get(key) {
                if slot.fingerprint.as_ref() == Some(&fingerprint) {
                    if let Some(resident) = slot.resident.clone() {
                        drop(inner);
                        self.emit_event(&RegistryEvent::Hit {
                            key: key.to_string(),
                        });
                        debug!(key, "returning resident instance");
                        return resident.downcast::<T>().map_err(|_| {
                            RegistryError::TypeMismatch {
                                key: key.to_string(),
                                expected: std::any::type_name::<T>(),
                            }
                        });
                    }
                }
            }
        }

        // Exclusive residency: evict whatever is resident before
        // constructing, regardless of which key owns it.
        if let Some(evicted_key) = inner.active.take() {
            let hook_result = match inner.slots.get_mut(&evicted_key) {
                Some(slot) => slot.evict(),
                None => Ok(()),
            };
            self.emit_event(&RegistryEvent::Evict {
                key: evicted_key.clone(),
            });
            debug!(evicted = %evicted_key, requested = key, "evicted resident instance");
            if let Err(source) = hook_result {
                warn!(key = %evicted_key, error = %source, "teardown hook failed during eviction");
                return Err(RegistryError::Teardown {
                    key: evicted_key,
                    source,
                });
            }
        }

        let instance = match build() {
            Ok(value) => Arc::new(value),
            Err(source) => {
                // The faulted construction is not cached; nothing is active.
                debug!(key, "construction failed, nothing is resident");
                return Err(RegistryError::Construction {
                    key: key.to_string(),
                    source,
                });
            }
        };

        if let Some(slot) = inner.slots.get_mut(key) {
            let erased: ResidentObject = instance.clone();
            slot.resident = Some(erased);
            slot.fingerprint = Some(fingerprint);
        }
        inner.active = Some(key.to_string());
        drop(inner);

        self.emit_event(&RegistryEvent::Build {
            key: key.to_string(),
        });
        debug!(key, "constructed new resident instance");
        Ok(instance)
    }

    /// Whether `key` has been registered.
    pub fn contains(&self, key: &str) -> bool {
        let found = self.lock_inner().slots.contains_key(key);
        self.emit_event(&RegistryEvent::Contains {
            key: key.to_string(),
            found,
        });
        found
    }

    /// Key of the slot currently holding the resident instance, if any.
    pub fn active_key(&self) -> Option<String> {
        self.lock_inner().active.clone()
    }

    /// Tear down the resident instance (if any) and wipe all slot state,
    /// registrations included. Keys must be registered again afterwards.
    ///
    /// Never fails and is idempotent: clearing an empty registry is a no-op,
    /// and a failing teardown hook is logged and swallowed — the instance is
    /// gone either way.
    pub fn clear(&self) {
        let mut inner = self.lock_inner();
        let evicted = inner.active.take();
        if let Some(evicted_key) = &evicted {
            if let Some(slot) = inner.slots.get_mut(evicted_key) {
                if let Err(error) = slot.evict() {
                    warn!(key = %evicted_key, %error, "teardown hook failed during clear");
                }
            }
        }
        inner.slots.clear();
        drop(inner);

        self.emit_event(&RegistryEvent::Clear {
            evicted: evicted.is_some(),
        });
        debug!("registry cleared");
    }

    /// Set a tracing callback invoked with a [`RegistryEvent`] on every
    /// registry operation.
    ///
    /// The callback must not call back into the same registry; some events
    /// are emitted while the registry lock is held.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self
            .shared
            .trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback (disables event emission).
    pub fn clear_trace_callback(&self) {
        let mut guard = self
            .shared
            .trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        let guard = self
            .shared
            .trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(callback) = guard.as_ref() {
            callback(event);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

// -------------------------------------------------------------------------------------------------
// Free functions over the process-wide registry
// -------------------------------------------------------------------------------------------------

/// Register a key in the process-wide registry with a no-op teardown hook.
pub fn register(key: impl Into<String>) {
    Registry::global().register(key);
}

/// Register a key in the process-wide registry with a teardown hook.
pub fn register_with_teardown<F>(key: impl Into<String>, teardown: F)
where
    F: Fn(ResidentObject) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Registry::global().register_with_teardown(key, teardown);
}

/// Get the instance for `key` from the process-wide registry, constructing
/// it if necessary. See [`Registry::get`].
pub fn get<T, A, F>(key: &str, args: A, build: F) -> Result<Arc<T>, RegistryError>
where
    T: Send + Sync + 'static,
    A: ToFingerprint,
    F: FnOnce() -> Result<T, BoxError>,
{
    Registry::global().get(key, args, build)
}

/// Whether `key` is registered in the process-wide registry.
pub fn contains(key: &str) -> bool {
    Registry::global().contains(key)
}

/// Key currently holding the resident instance in the process-wide registry.
pub fn active_key() -> Option<String> {
    Registry::global().active_key()
}

/// Tear down and wipe the process-wide registry. See [`Registry::clear`].
pub fn clear() {
    Registry::global().clear();
}

/// Set a tracing callback on the process-wide registry.
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    Registry::global().set_trace_callback(callback);
}

/// Clear the tracing callback on the process-wide registry.
pub fn clear_trace_callback() {
    Registry::global().clear_trace_callback();
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
