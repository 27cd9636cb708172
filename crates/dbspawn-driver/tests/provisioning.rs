//! End-to-end provisioning scenarios through the facade.

use std::sync::Arc;

use assert_matches::assert_matches;

use dbspawn_core::{AddressKey, ConnectionProps, Driver, DriverError, EngineError};
use dbspawn_driver::EmbeddedDriver;
use dbspawn_testkit::{init_test_logging, ListenerBoard, MockDelegate, MockEngine};

fn fixture() -> (EmbeddedDriver<MockDelegate>, MockDelegate, MockEngine) {
    init_test_logging();
    let board = ListenerBoard::new();
    let delegate = MockDelegate::new(board.clone());
    let engine = MockEngine::new(board);
    let driver = EmbeddedDriver::new(delegate.clone(), Arc::new(engine.clone()));
    (driver, delegate, engine)
}

#[test]
fn test_connect_provisions_embedded_instance_for_localhost() {
    let (driver, delegate, engine) = fixture();
    let key = AddressKey::new("localhost", 3307);

    let mut connection = driver
        .connect("mock://localhost:3307/test", &ConnectionProps::new())
        .expect("connect should provision and succeed");

    // One refused attempt, one embedded start, one successful retry.
    assert_eq!(delegate.connect_attempts(), 2);
    assert_eq!(engine.start_count(), 1);
    assert!(driver.registry().contains(&key));
    assert_eq!(driver.registry().len(), 1);
    assert_eq!(driver.shutdown().pending(), vec![key]);

    // The returned connection answers a trivial query.
    assert!(connection.is_valid());
    connection.execute("SELECT 1").expect("trivial query");
}

#[test]
fn test_second_connect_reuses_running_instance() {
    let (driver, delegate, engine) = fixture();
    let props = ConnectionProps::new();

    driver
        .connect("mock://localhost:3307/test", &props)
        .expect("first connect provisions");
    driver
        .connect("mock://localhost:3307/test", &props)
        .expect("second connect goes straight through");

    assert_eq!(engine.start_count(), 1);
    // Second call hits the already-listening server on the first attempt.
    assert_eq!(delegate.connect_attempts(), 3);
}

#[test]
fn test_external_server_is_used_without_provisioning() {
    let (driver, _delegate, engine) = fixture();
    engine.board().listen("localhost", 3306);

    driver
        .connect("mock://localhost:3306/test", &ConnectionProps::new())
        .expect("externally managed server answers");

    assert_eq!(engine.start_count(), 0);
    assert!(driver.registry().is_empty());
}

#[test]
fn test_remote_target_never_provisions() {
    let (driver, delegate, engine) = fixture();

    let err = driver
        .connect("mock://remote-db.example.com:3306/test", &ConnectionProps::new())
        .expect_err("nothing listens remotely and nothing may be started");

    assert!(err.is_transient(), "original failure kind is preserved");
    assert_eq!(engine.start_count(), 0);
    assert!(driver.registry().is_empty());
    assert!(driver.shutdown().pending().is_empty());
    // The delegated connect was still retried exactly once.
    assert_eq!(delegate.connect_attempts(), 2);
}

#[test]
fn test_multi_host_url_provisions_only_the_local_entry() {
    let (driver, _delegate, engine) = fixture();

    driver
        .connect("mock://db-a:3306,localhost:3307/test", &ConnectionProps::new())
        .expect("local entry gets an embedded instance");

    assert_eq!(engine.start_count(), 1);
    assert!(driver.registry().contains(&AddressKey::new("localhost", 3307)));
    assert!(!driver.registry().contains(&AddressKey::new("db-a", 3306)));
}

#[test]
fn test_bind_failure_surfaces_as_unable_to_start() {
    let (driver, delegate, engine) = fixture();
    engine.fail_port(3307);

    let err = driver
        .connect("mock://localhost:3307/test", &ConnectionProps::new())
        .expect_err("provisioning cannot bind the port");

    assert_matches!(
        err,
        DriverError::UnableToStartDatabase {
            source: EngineError::PortInUse { port: 3307 },
            ..
        }
    );
    assert!(driver.registry().is_empty());
    assert!(driver.shutdown().pending().is_empty());
    // The fatal error preempts the retry.
    assert_eq!(delegate.connect_attempts(), 1);
}

#[test]
fn test_access_denied_passes_through_untouched() {
    let (driver, delegate, engine) = fixture();
    delegate.inject_error(DriverError::access_denied("bad password"));

    let err = driver
        .connect("mock://localhost:3307/test", &ConnectionProps::new())
        .expect_err("auth failures are not recoverable");

    assert_matches!(err, DriverError::AccessDenied { .. });
    assert_eq!(engine.start_count(), 0);
    assert_eq!(delegate.connect_attempts(), 1);
}

#[test]
fn test_malformed_url_passes_through_untouched() {
    let (driver, _delegate, engine) = fixture();

    let err = driver
        .connect("mock:///missing-hosts", &ConnectionProps::new())
        .expect_err("parse failures are not recoverable");

    assert_matches!(err, DriverError::InvalidUrl { .. });
    assert_eq!(engine.start_count(), 0);
}

#[test]
fn test_reconnect_after_teardown_starts_a_fresh_instance() {
    let (driver, _delegate, engine) = fixture();
    let props = ConnectionProps::new();
    let key = AddressKey::new("localhost", 3307);

    driver
        .connect("mock://localhost:3307/test", &props)
        .expect("first provisioning");
    driver.shutdown().run();
    assert!(!engine.board().is_listening(&key));
    assert!(driver.registry().is_empty());

    driver
        .connect("mock://localhost:3307/test", &props)
        .expect("reprovisioning after teardown");
    assert_eq!(engine.start_count(), 2);
    assert!(driver.registry().contains(&key));
}
