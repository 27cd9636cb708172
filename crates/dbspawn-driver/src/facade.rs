//! The connection facade.
//!
//! Wraps a [`DelegateDriver`] and implements [`Driver`] on top of it. The
//! only added behavior is the fallback path: when the delegate reports that
//! nothing is listening at the target address, and the URL addresses the
//! local machine, an embedded instance is provisioned for that host:port and
//! the delegated connect is retried exactly once. Everything else is a pure
//! pass-through.

use std::sync::Arc;

use tracing::debug;

use dbspawn_core::{
    Connection, ConnectionProps, ConnectionRequest, DelegateDriver, Driver, DriverError,
    DriverPropertyInfo, DriverVersion, EmbeddedEngine,
};

use crate::registry::InstanceRegistry;
use crate::shutdown::ShutdownCoordinator;

/// Driver facade that starts an embedded database when no local server is
/// reachable.
///
/// Assumes connections target `localhost` and is intended for integration
/// tests only. Registry and shutdown coordinator are injectable so tests can
/// run against isolated lifecycles; [`EmbeddedDriver::new`] builds a private
/// pair for the common case.
pub struct EmbeddedDriver<D> {
    delegate: D,
    engine: Arc<dyn EmbeddedEngine>,
    registry: Arc<InstanceRegistry>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl<D: DelegateDriver> EmbeddedDriver<D> {
    /// Create a facade with its own registry and shutdown coordinator
    pub fn new(delegate: D, engine: Arc<dyn EmbeddedEngine>) -> Self {
        let registry = InstanceRegistry::shared();
        let shutdown = ShutdownCoordinator::shared(Arc::clone(&registry));
        Self::with_registry(delegate, engine, registry, shutdown)
    }

    /// Create a facade over an existing registry and coordinator.
    ///
    /// The coordinator must tear down the same registry instance, otherwise
    /// provisioned instances would never be stopped.
    pub fn with_registry(
        delegate: D,
        engine: Arc<dyn EmbeddedEngine>,
        registry: Arc<InstanceRegistry>,
        shutdown: Arc<ShutdownCoordinator>,
    ) -> Self {
        Self {
            delegate,
            engine,
            registry,
            shutdown,
        }
    }

    /// The wrapped delegate driver
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// The registry of instances this facade has provisioned
    pub fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }

    /// The shutdown coordinator for this facade's instances
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Provisioning path: resolve the target addresses, start an embedded
    /// instance if a local one is named, then retry the delegated connect
    /// exactly once.
    ///
    /// When no address denotes the local machine, provisioning is skipped
    /// entirely and the retry runs straight against the delegate, so a
    /// genuine remote failure surfaces as-is.
    fn provision_and_reconnect(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Box<dyn Connection>, DriverError> {
        let request = ConnectionRequest::resolve(&self.delegate, url, props)?;
        match request.first_local() {
            Some(local) => {
                self.registry
                    .ensure_started(self.engine.as_ref(), local, &self.shutdown)?;
            }
            None => {
                debug!("no local address in url, skipping provisioning");
            }
        }
        self.delegate.connect(url, props)
    }
}

impl<D: DelegateDriver> Driver for EmbeddedDriver<D> {
    fn connect(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Box<dyn Connection>, DriverError> {
        match self.delegate.connect(url, props) {
            Ok(connection) => Ok(connection),
            Err(error) if error.is_transient() => {
                debug!(%error, "delegate connect refused, entering provisioning path");
                self.provision_and_reconnect(url, props)
            }
            Err(error) => Err(error),
        }
    }

    fn accepts_url(&self, url: &str) -> Result<bool, DriverError> {
        self.delegate.accepts_url(url)
    }

    fn property_info(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Vec<DriverPropertyInfo>, DriverError> {
        self.delegate.property_info(url, props)
    }

    fn version(&self) -> DriverVersion {
        self.delegate.version()
    }

    fn compliant(&self) -> bool {
        self.delegate.compliant()
    }

    fn parent_logger(&self) -> Result<String, DriverError> {
        Err(DriverError::unsupported("parent logger"))
    }
}
