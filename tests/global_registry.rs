//! Integration tests for the process-wide registry and its free-function
//! surface.
//!
//! NOTE: All tests use #[serial] because they share the single global
//! registry. Running them in parallel would cause interference and
//! non-deterministic failures.

use resident_registry::{
    active_key, clear, clear_trace_callback, contains, get, register, register_with_teardown,
    set_trace_callback, Registry, RegistryError, ResidentFn,
};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
#[serial]
fn test_free_function_round_trip() {
    clear();

    register("model");
    assert!(contains("model"));
    assert!(!contains("other"));

    let value = get::<i32, _, _>("model", (1,), || Ok(41)).unwrap();
    assert_eq!(*value, 41);
    assert_eq!(active_key().as_deref(), Some("model"));

    clear();
    assert_eq!(active_key(), None);
    assert!(!contains("model"));
}

#[test]
#[serial]
fn test_global_handles_share_state() {
    clear();

    let first = Registry::global();
    let second = Registry::global();

    first.register("model");
    assert!(second.contains("model"));
    assert!(contains("model"));

    second.get::<i32, _, _>("model", (1,), || Ok(1)).unwrap();
    assert_eq!(first.active_key().as_deref(), Some("model"));

    clear();
}

#[test]
#[serial]
fn test_global_teardown_hook_runs_on_eviction() {
    clear();

    let teardowns = Arc::new(AtomicUsize::new(0));
    let hook = teardowns.clone();
    register_with_teardown("a", move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    register("b");

    get::<i32, _, _>("a", (1,), || Ok(1)).unwrap();
    get::<i32, _, _>("b", (2,), || Ok(2)).unwrap();
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);

    clear();
}

#[test]
#[serial]
fn test_global_not_registered() {
    clear();

    let result = get::<i32, _, _>("never", (), || Ok(1));
    assert!(matches!(result, Err(RegistryError::NotRegistered { .. })));
}

#[test]
#[serial]
fn test_global_trace_callback() {
    clear();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    set_trace_callback(move |event| {
        sink.lock().unwrap().push(format!("{}", event));
    });

    register("model");
    get::<i32, _, _>("model", (1,), || Ok(1)).unwrap();

    {
        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], "register { key: model, inserted: true }");
        assert_eq!(captured[1], "build { key: model }");
    }

    clear_trace_callback();
    clear();
    assert_eq!(events.lock().unwrap().len(), 2);
}

#[test]
#[serial]
fn test_resident_fn_defaults_to_global_registry() {
    clear();

    let load = ResidentFn::new("global-model", |n: &(i64,)| Ok(n.0 * 2));
    assert!(contains("global-model"));

    let value = load.call((21,)).unwrap();
    assert_eq!(*value, 42);
    assert_eq!(active_key().as_deref(), Some("global-model"));

    clear();
}
