//! # Resident Registry
//!
//! A single-slot resource cache with exclusive-residency eviction: across
//! all registered keys, at most one constructed instance exists at any
//! moment. Requesting a different key — or the same key with different
//! construction arguments — tears down the resident instance via its
//! registered hook before the new one is constructed.
//!
//! Built for resources that are expensive to construct and expensive to
//! hold, such as a model loaded onto an accelerator: the previous instance
//! must give its capacity back before the next one can claim it.
//!
//! ## Quick Start
//!
//! ```rust
//! use resident_registry::{fingerprint, Registry};
//!
//! let registry = Registry::new();
//! registry.register("tokenizer");
//!
//! // First call constructs; the second returns the resident instance.
//! let a = registry
//!     .get::<String, _, _>("tokenizer", fingerprint!("en"), || Ok("vocab:en".to_string()))
//!     .unwrap();
//! let b = registry
//!     .get::<String, _, _>("tokenizer", fingerprint!("en"), || unreachable!())
//!     .unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```
//!
//! ## Features
//!
//! - **Exclusive residency**: one live instance across the whole registry,
//!   torn down before its replacement is constructed
//! - **Thread-safe**: one exclusive lock guards the full
//!   teardown/construct/publish sequence
//! - **Argument fingerprinting**: cache hits are decided by canonical value
//!   equality, insensitive to numeric type ([`Fingerprint`])
//! - **Tracing support**: a [`RegistryEvent`] callback for every operation,
//!   plus `tracing` logs
//!
//! ## Main types and functions
//!
//! - [`Registry`] - a cheap-clone handle; [`Registry::global`] for the
//!   process-wide instance
//! - [`register`] / [`register_with_teardown`] - register a key (idempotent)
//! - [`get`] - return the resident instance or evict-and-construct
//! - [`clear`] - tear down and wipe everything, registrations included
//! - [`ResidentFn`] - wrap a constructor so every call routes through the
//!   registry
//! - [`fingerprint!`] - build a [`Fingerprint`] from positional and named
//!   arguments

mod fingerprint;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod resident;

pub use fingerprint::{ArgValue, Fingerprint, ToFingerprint};
pub use registry::{
    active_key, clear, clear_trace_callback, contains, get, register, register_with_teardown,
    set_trace_callback, Registry, ResidentObject, TeardownFn, TraceCallback,
};
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::RegistryEvent;
pub use resident::{typed_teardown, ResidentFn};
