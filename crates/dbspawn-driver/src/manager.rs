//! Driver-manager style lookup-by-URL.
//!
//! Mirrors the ambient registry a JDBC-style facade registers itself with:
//! drivers are registered once (order-independent from the caller's point of
//! view) and connection requests are routed to the first registered driver
//! that accepts the URL. A process-wide manager is available through
//! [`driver_manager`]; tests construct isolated managers instead.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use dbspawn_core::{Connection, ConnectionProps, Driver, DriverError};

/// Ordered collection of registered drivers with lookup-by-URL.
#[derive(Default)]
pub struct DriverManager {
    drivers: Mutex<Vec<Arc<dyn Driver>>>,
}

impl DriverManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver. Later registrations are consulted after earlier
    /// ones; registering the same driver twice consults it twice.
    pub fn register(&self, driver: Arc<dyn Driver>) {
        self.drivers.lock().push(driver);
    }

    /// Number of registered drivers
    pub fn len(&self) -> usize {
        self.drivers.lock().len()
    }

    /// Whether no driver is registered
    pub fn is_empty(&self) -> bool {
        self.drivers.lock().is_empty()
    }

    /// Connect through the first registered driver that accepts the URL.
    ///
    /// The driver list is snapshotted before any driver runs, so a connect
    /// in flight never holds the manager's lock. An `accepts_url` error from
    /// a driver propagates; a URL no driver accepts is
    /// [`DriverError::NoSuitableDriver`].
    pub fn connect(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Box<dyn Connection>, DriverError> {
        let drivers: Vec<Arc<dyn Driver>> = self.drivers.lock().clone();
        for driver in drivers {
            if driver.accepts_url(url)? {
                return driver.connect(url, props);
            }
            debug!("registered driver declined url");
        }
        Err(DriverError::NoSuitableDriver {
            url: url.to_owned(),
        })
    }
}

impl std::fmt::Debug for DriverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverManager")
            .field("drivers", &self.len())
            .finish()
    }
}

/// The process-wide driver manager.
///
/// One-time lazily initialized; external collaborators that want
/// driver-manager-style lookup share this instance. Tests that register
/// drivers here must serialize themselves (the registration is process-wide
/// state); preferring an isolated [`DriverManager`] per test avoids that.
pub fn driver_manager() -> &'static DriverManager {
    static GLOBAL: Lazy<DriverManager> = Lazy::new(DriverManager::new);
    &GLOBAL
}
