/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use resident_registry::RegistryEvent;
///
/// let event = RegistryEvent::Hit { key: "llama".to_string() };
/// println!("{:?}", event);
/// ```
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A key was registered.
    Register {
        /// The key that was registered
        key: String,
        /// Whether a new slot was inserted (`false` when the key was
        /// already registered and the call was a no-op)
        inserted: bool,
    },

    /// `get` returned the already-resident instance unchanged.
    Hit {
        /// The key that was requested
        key: String,
    },

    /// The resident instance was evicted and its teardown hook invoked.
    Evict {
        /// The key whose instance was torn down
        key: String,
    },

    /// A new instance was constructed and became resident.
    Build {
        /// The key the instance was constructed for
        key: String,
    },

    /// A key membership check was performed.
    Contains {
        /// The key that was checked
        key: String,
        /// Whether the key is registered
        found: bool,
    },

    /// The registry was cleared.
    Clear {
        /// Whether a resident instance was torn down in the process
        evicted: bool,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register { key, inserted } => {
                write!(f, "register {{ key: {}, inserted: {} }}", key, inserted)
            }
            RegistryEvent::Hit { key } => write!(f, "hit {{ key: {} }}", key),
            RegistryEvent::Evict { key } => write!(f, "evict {{ key: {} }}", key),
            RegistryEvent::Build { key } => write!(f, "build {{ key: {} }}", key),
            RegistryEvent::Contains { key, found } => {
                write!(f, "contains {{ key: {}, found: {} }}", key, found)
            }
            RegistryEvent::Clear { evicted } => {
                write!(f, "clear {{ evicted: {} }}", evicted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_register() {
        let ev = RegistryEvent::Register {
            key: "llama".to_string(),
            inserted: true,
        };
        assert_eq!(ev.to_string(), "register { key: llama, inserted: true }");
    }

    #[test]
    fn test_display_hit() {
        let ev = RegistryEvent::Hit {
            key: "llama".to_string(),
        };
        assert_eq!(ev.to_string(), "hit { key: llama }");
    }

    #[test]
    fn test_display_evict() {
        let ev = RegistryEvent::Evict {
            key: "bert".to_string(),
        };
        assert_eq!(ev.to_string(), "evict { key: bert }");
    }

    #[test]
    fn test_display_build() {
        let ev = RegistryEvent::Build {
            key: "bert".to_string(),
        };
        assert_eq!(ev.to_string(), "build { key: bert }");
    }

    #[test]
    fn test_display_contains() {
        let ev = RegistryEvent::Contains {
            key: "llama".to_string(),
            found: false,
        };
        assert_eq!(ev.to_string(), "contains { key: llama, found: false }");
    }

    #[test]
    fn test_display_clear() {
        let ev = RegistryEvent::Clear { evicted: true };
        assert_eq!(ev.to_string(), "clear { evicted: true }");
    }
}
