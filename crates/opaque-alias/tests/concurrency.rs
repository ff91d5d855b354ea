use opaque_alias::{AliasManager, EntityType, MemoryBackend};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_route_initialization_agrees() {
    // Tests: get-or-create under contention never mints two aliases for one route
    let manager = Arc::new(AliasManager::init_default_config(Arc::new(MemoryBackend::new())).unwrap());
    let barrier = Arc::new(Barrier::new(8));
    let mut handles = vec![];

    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            manager.initialize_secure_routes().unwrap()
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
    let stats = manager.store().stats();
    assert_eq!(stats.routes, results[0].len());
    assert_eq!(stats.reverse, results[0].len());
}

#[test]
fn test_concurrent_id_aliasing() {
    // Tests: one alias per real id, even when threads race on the same ids
    let manager = Arc::new(AliasManager::init_default_config(Arc::new(MemoryBackend::new())).unwrap());
    let barrier = Arc::new(Barrier::new(4));
    let mut handles = vec![];

    for _ in 0..4 {
        let manager = Arc::clone(&manager);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            (0..50)
                .map(|i| {
                    manager
                        .get_or_create_secure_id(&format!("p{}", i), EntityType::Product)
                        .unwrap()
                })
                .collect::<Vec<_>>()
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
    let unique: HashSet<_> = results[0].iter().collect();
    assert_eq!(unique.len(), 50);
    assert_eq!(manager.store().stats().ids, 50);
    assert_eq!(manager.store().stats().reverse, 50);
}

#[test]
#[cfg_attr(not(feature = "expensive_tests"), ignore)]
fn test_concurrent_generation_uniqueness() {
    let manager = Arc::new(AliasManager::init_default_config(Arc::new(MemoryBackend::new())).unwrap());
    let mut handles = vec![];
    for _ in 0..10 {
        let manager = Arc::clone(&manager);
        handles.push(thread::spawn(move || {
            (0..1000)
                .map(|_| manager.generate_secure_id("x", EntityType::Order).unwrap())
                .collect::<Vec<_>>()
        }));
    }
    let all: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let unique: HashSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), all.len(), "Found duplicate tokens");
}
