//! Address-keyed registry of running embedded instances.
//!
//! The registry map is the only shared mutable state in the system. All
//! structural mutations and every check-then-act sequence on a key go
//! through one `parking_lot::Mutex`, so no caller can observe a partially
//! initialized entry or duplicate-start an address.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use dbspawn_core::{AddressKey, DriverError, EmbeddedEngine, EngineError, EngineInstance, HostAddress};

use crate::shutdown::ShutdownCoordinator;

/// A started embedded instance, owned by its registry entry.
///
/// The handle only exists for instances whose start succeeded, and stopping
/// consumes it, so an instance is never stopped twice.
pub struct InstanceHandle {
    key: AddressKey,
    instance: Box<dyn EngineInstance>,
}

impl InstanceHandle {
    fn new(key: AddressKey, instance: Box<dyn EngineInstance>) -> Self {
        Self { key, instance }
    }

    /// The address this instance is registered under
    pub fn key(&self) -> &AddressKey {
        &self.key
    }

    /// The port the instance binds
    pub fn port(&self) -> u16 {
        self.instance.port()
    }

    /// Stop the instance, consuming the handle.
    pub fn stop(mut self) -> Result<(), EngineError> {
        self.instance.stop()
    }
}

impl std::fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Outcome of a provisioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// This call created and started the instance
    Started,
    /// Another caller already provisioned the address
    AlreadyRunning,
}

/// Process-lifetime mapping from [`AddressKey`] to [`InstanceHandle`].
///
/// Explicitly constructed and injectable: the facade owns one by default,
/// tests build isolated registries of their own.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: Mutex<HashMap<AddressKey, InstanceHandle>>,
}

impl InstanceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry behind an `Arc`, ready to share with a
    /// [`ShutdownCoordinator`]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Whether an instance is registered for the key
    pub fn contains(&self, key: &AddressKey) -> bool {
        self.instances.lock().contains_key(key)
    }

    /// Number of registered instances
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    /// Whether no instance is registered
    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }

    /// Keys of all registered instances, in no particular order
    pub fn keys(&self) -> Vec<AddressKey> {
        self.instances.lock().keys().cloned().collect()
    }

    /// Ensure an embedded instance is running for the address.
    ///
    /// Double-checked: a lock-free-looking existence check first, then the
    /// registry lock, a re-check, and only then create + start + insert +
    /// shutdown registration, all inside the critical section. Concurrent
    /// callers for the same key either take the fast path or block here
    /// until the first caller finishes registration.
    ///
    /// A create or start failure surfaces as
    /// [`DriverError::UnableToStartDatabase`] and leaves no registry entry
    /// and no shutdown registration behind.
    pub fn ensure_started(
        &self,
        engine: &dyn EmbeddedEngine,
        address: &HostAddress,
        shutdown: &ShutdownCoordinator,
    ) -> Result<Provisioned, DriverError> {
        let key = address.key();
        if self.contains(&key) {
            return Ok(Provisioned::AlreadyRunning);
        }

        let mut instances = self.instances.lock();
        if instances.contains_key(&key) {
            return Ok(Provisioned::AlreadyRunning);
        }

        info!(%key, "creating embedded database instance");
        let mut instance = engine
            .create(address.port)
            .map_err(|source| DriverError::unable_to_start(key.clone(), source))?;

        debug!(%key, "starting embedded database instance");
        instance
            .start()
            .map_err(|source| DriverError::unable_to_start(key.clone(), source))?;

        instances.insert(key.clone(), InstanceHandle::new(key.clone(), instance));
        shutdown.register(key);
        Ok(Provisioned::Started)
    }

    /// Atomically remove and return the instance for a key, if present.
    pub fn remove(&self, key: &AddressKey) -> Option<InstanceHandle> {
        self.instances.lock().remove(key)
    }
}
