//! Race-safety of provisioning under parallel connect calls.

use std::sync::{Arc, Barrier};
use std::thread;

use dbspawn_core::{AddressKey, ConnectionProps, Driver};
use dbspawn_driver::EmbeddedDriver;
use dbspawn_testkit::{init_test_logging, ListenerBoard, MockDelegate, MockEngine};

fn fixture() -> (Arc<EmbeddedDriver<MockDelegate>>, MockEngine) {
    init_test_logging();
    let board = ListenerBoard::new();
    let delegate = MockDelegate::new(board.clone());
    let engine = MockEngine::new(board);
    let driver = Arc::new(EmbeddedDriver::new(delegate, Arc::new(engine.clone())));
    (driver, engine)
}

#[test]
fn test_concurrent_connects_start_exactly_one_instance() {
    let (driver, engine) = fixture();
    let workers = 16;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let driver = Arc::clone(&driver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                driver.connect("mock://localhost:3307/test", &ConnectionProps::new())
            })
        })
        .collect();

    for handle in handles {
        let mut connection = handle
            .join()
            .expect("worker thread must not panic")
            .expect("every caller gets a live connection");
        assert!(connection.is_valid());
    }

    assert_eq!(engine.start_count(), 1);
    assert_eq!(driver.registry().len(), 1);
    assert_eq!(
        driver.shutdown().pending(),
        vec![AddressKey::new("localhost", 3307)]
    );
}

#[test]
fn test_concurrent_connects_to_distinct_ports_are_independent() {
    let (driver, engine) = fixture();
    let ports = [3307u16, 3308, 3309, 3310];
    let barrier = Arc::new(Barrier::new(ports.len()));

    let handles: Vec<_> = ports
        .iter()
        .map(|&port| {
            let driver = Arc::clone(&driver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let url = format!("mock://localhost:{port}/test");
                driver.connect(&url, &ConnectionProps::new())
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .expect("worker thread must not panic")
            .expect("each port provisions independently");
    }

    assert_eq!(engine.start_count(), ports.len());
    let mut keys = driver.registry().keys();
    keys.sort();
    let expected: Vec<_> = ports
        .iter()
        .map(|&port| AddressKey::new("localhost", port))
        .collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_concurrent_shutdown_triggers_stop_once() {
    let (driver, engine) = fixture();
    driver
        .connect("mock://localhost:3307/test", &ConnectionProps::new())
        .expect("provisioning");
    let key = AddressKey::new("localhost", 3307);

    let shutdown = Arc::clone(driver.shutdown());
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shutdown = Arc::clone(&shutdown);
            let barrier = Arc::clone(&barrier);
            let key = key.clone();
            thread::spawn(move || {
                barrier.wait();
                shutdown.run_key(&key);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread must not panic");
    }

    assert_eq!(engine.stop_count(), 1);
    assert!(driver.registry().is_empty());
}
