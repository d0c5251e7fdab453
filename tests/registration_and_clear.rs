//! Integration tests for registration semantics and `clear`.

use resident_registry::{Registry, RegistryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_get_on_unregistered_key_leaves_state_unchanged() {
    let registry = Registry::new();
    registry.register("known");
    registry.get::<i32, _, _>("known", (1,), || Ok(1)).unwrap();

    let result = registry.get::<i32, _, _>("unknown", (1,), || Ok(2));
    assert!(matches!(
        result,
        Err(RegistryError::NotRegistered { ref key }) if key == "unknown"
    ));

    // The resident instance survived the failed lookup.
    assert_eq!(registry.active_key().as_deref(), Some("known"));
    let resident = registry
        .get::<i32, _, _>("known", (1,), || panic!("should be a hit"))
        .unwrap();
    assert_eq!(*resident, 1);
}

#[test]
fn test_register_constructs_nothing() {
    let registry = Registry::new();
    registry.register("model");
    assert!(registry.contains("model"));
    assert_eq!(registry.active_key(), None);
}

#[test]
fn test_double_registration_keeps_first_hook() {
    let registry = Registry::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let hook = first.clone();
    registry.register_with_teardown("model", move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let hook = second.clone();
    registry.register_with_teardown("model", move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    registry.get::<i32, _, _>("model", (1,), || Ok(1)).unwrap();
    registry.get::<i32, _, _>("model", (2,), || Ok(2)).unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reregistration_does_not_touch_resident_instance() {
    let registry = Registry::new();
    registry.register("model");

    let instance = registry
        .get::<i32, _, _>("model", (1,), || Ok(1))
        .unwrap();
    registry.register("model");

    let after = registry
        .get::<i32, _, _>("model", (1,), || panic!("should still be a hit"))
        .unwrap();
    assert!(Arc::ptr_eq(&instance, &after));
}

#[test]
fn test_clear_tears_down_active_instance_once() {
    let registry = Registry::new();
    let teardowns = Arc::new(AtomicUsize::new(0));

    let hook = teardowns.clone();
    registry.register_with_teardown("a", move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let hook = teardowns.clone();
    registry.register_with_teardown("b", move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    registry.get::<i32, _, _>("a", (1,), || Ok(1)).unwrap();
    registry.clear();

    // Only the resident instance is torn down; "b" never held one.
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_clear_wipes_registrations() {
    let registry = Registry::new();
    registry.register("a");
    registry.register("b");
    registry.get::<i32, _, _>("a", (1,), || Ok(1)).unwrap();

    registry.clear();

    assert!(!registry.contains("a"));
    assert!(!registry.contains("b"));
    for key in ["a", "b"] {
        let result = registry.get::<i32, _, _>(key, (1,), || Ok(1));
        assert!(matches!(result, Err(RegistryError::NotRegistered { .. })));
    }

    // Re-registration brings the key back to life.
    registry.register("a");
    assert!(registry.get::<i32, _, _>("a", (1,), || Ok(1)).is_ok());
}

#[test]
fn test_clear_without_active_instance_invokes_no_hook() {
    let registry = Registry::new();
    let teardowns = Arc::new(AtomicUsize::new(0));
    let hook = teardowns.clone();
    registry.register_with_teardown("model", move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    registry.clear();
    assert_eq!(teardowns.load(Ordering::SeqCst), 0);
}

#[test]
fn test_clear_is_idempotent() {
    let registry = Registry::new();
    registry.register("model");
    registry.get::<i32, _, _>("model", (1,), || Ok(1)).unwrap();

    registry.clear();
    registry.clear();
    assert_eq!(registry.active_key(), None);
}
