//! Exclusive-residency model cache demo.
//!
//! Demonstrates:
//! - Registering keys with teardown hooks that return accelerator memory
//! - Cache hits on repeated `get` calls with equal arguments
//! - Eviction before construction, so the next model fits on the device
//! - The `ResidentFn` adapter wrapping a constructor
//!
//! Run with: `cargo run --example model_cache`

use resident_registry::{fingerprint, BoxError, Registry, ResidentFn};
use std::sync::{Arc, Mutex};

/// Fake accelerator with a fixed memory budget. Stands in for a real device
/// allocator: claims fail when the budget is exhausted, which is exactly why
/// eviction must run before construction.
struct Device {
    free_mb: Mutex<usize>,
}

impl Device {
    fn new(budget_mb: usize) -> Arc<Self> {
        Arc::new(Device {
            free_mb: Mutex::new(budget_mb),
        })
    }

    fn claim(&self, mb: usize) -> Result<(), BoxError> {
        let mut free = self.free_mb.lock().unwrap();
        if *free < mb {
            return Err(format!("device has {} MB free, need {} MB", *free, mb).into());
        }
        *free -= mb;
        Ok(())
    }

    fn release(&self, mb: usize) {
        *self.free_mb.lock().unwrap() += mb;
    }

    fn free(&self) -> usize {
        *self.free_mb.lock().unwrap()
    }
}

/// A "loaded model": just a name and the device memory it occupies.
struct LoadedModel {
    checkpoint: String,
    footprint_mb: usize,
}

fn load_model(device: &Arc<Device>, checkpoint: &str, footprint_mb: usize) -> Result<LoadedModel, BoxError> {
    device.claim(footprint_mb)?;
    println!("   loaded {checkpoint} ({footprint_mb} MB), device free: {} MB", device.free());
    Ok(LoadedModel {
        checkpoint: checkpoint.to_string(),
        footprint_mb,
    })
}

fn main() {
    println!("=== resident-registry: Model Cache ===\n");

    // A 10 GB device: only one of the models below fits at a time.
    let device = Device::new(10_000);
    let registry = Registry::new();

    // -------------------------------------------------------------------------
    // 1. Register a model key with a memory-releasing teardown hook
    // -------------------------------------------------------------------------
    println!("1. Registering 'llm' with a teardown hook...");

    let release_device = device.clone();
    registry.register_with_teardown("llm", move |instance| {
        let model = instance
            .downcast::<LoadedModel>()
            .map_err(|_| "llm slot held a foreign type")?;
        release_device.release(model.footprint_mb);
        println!("   released {} ({} MB back)", model.checkpoint, model.footprint_mb);
        Ok(())
    });

    // -------------------------------------------------------------------------
    // 2. First get constructs; the second is a cache hit
    // -------------------------------------------------------------------------
    println!("\n2. Loading the 7B checkpoint twice...");

    let build_device = device.clone();
    let model = registry
        .get::<LoadedModel, _, _>("llm", fingerprint!("ckpt-7b"; quant = "q8"), move || {
            load_model(&build_device, "ckpt-7b", 8_000)
        })
        .unwrap();
    println!("   got {}", model.checkpoint);

    let hit = registry
        .get::<LoadedModel, _, _>("llm", fingerprint!("ckpt-7b"; quant = "q8"), || {
            unreachable!("cache hit, constructor does not run")
        })
        .unwrap();
    println!("   got {} again (same instance: {})", hit.checkpoint, Arc::ptr_eq(&model, &hit));

    // -------------------------------------------------------------------------
    // 3. New arguments evict the old instance before loading the new one
    // -------------------------------------------------------------------------
    println!("\n3. Switching to the 13B checkpoint (would not fit alongside)...");

    drop(model);
    drop(hit);
    let build_device = device.clone();
    let model = registry
        .get::<LoadedModel, _, _>("llm", fingerprint!("ckpt-13b"; quant = "q8"), move || {
            load_model(&build_device, "ckpt-13b", 9_000)
        })
        .unwrap();
    println!("   now resident: {}", model.checkpoint);
    drop(model);

    // -------------------------------------------------------------------------
    // 4. A ResidentFn adapter competes for the same single slot
    // -------------------------------------------------------------------------
    println!("\n4. Loading an embedder through a ResidentFn adapter...");

    let build_device = device.clone();
    let release_device = device.clone();
    let embedder = ResidentFn::in_registry_with_teardown(
        registry.clone(),
        "embedder",
        move |(checkpoint, mb): &(String, i64)| load_model(&build_device, checkpoint, *mb as usize),
        move |evicted: Arc<LoadedModel>| {
            release_device.release(evicted.footprint_mb);
            println!("   released {}", evicted.checkpoint);
            Ok(())
        },
    );

    let embedding_model = embedder.call(("embed-base".to_string(), 2_000)).unwrap();
    println!("   active key: {:?}", registry.active_key());
    drop(embedding_model);

    // -------------------------------------------------------------------------
    // 5. Clear tears down whatever is resident
    // -------------------------------------------------------------------------
    println!("\n5. Clearing the registry...");

    registry.clear();
    println!("   device free after clear: {} MB", device.free());
}
