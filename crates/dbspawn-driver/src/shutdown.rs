//! Deferred teardown of provisioned instances.
//!
//! Instead of an implicit process-exit hook, shutdown is an explicit,
//! ordered list of pending per-address actions. A test harness can drive
//! [`ShutdownCoordinator::run`] (or a single key via
//! [`ShutdownCoordinator::run_key`]) deterministically; dropping the
//! coordinator runs whatever is still pending.
//!
//! Each action removes its key from the registry first (an atomic
//! take), then stops the returned handle, so a doubly-triggered action
//! finds nothing the second time and is a silent no-op.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use dbspawn_core::AddressKey;

use crate::registry::InstanceRegistry;

/// Executes at-most-once stop actions for registered addresses.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    registry: Arc<InstanceRegistry>,
    pending: Mutex<Vec<AddressKey>>,
}

impl ShutdownCoordinator {
    /// Create a coordinator over the given registry
    pub fn new(registry: Arc<InstanceRegistry>) -> Self {
        Self {
            registry,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Create a coordinator behind an `Arc`, ready to share with a facade
    pub fn shared(registry: Arc<InstanceRegistry>) -> Arc<Self> {
        Arc::new(Self::new(registry))
    }

    /// The registry this coordinator tears down
    pub fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }

    /// Register a pending shutdown action for the key.
    ///
    /// At most one action is kept per key; re-registration is a no-op.
    /// Callers only register keys whose instance start succeeded.
    pub fn register(&self, key: AddressKey) {
        let mut pending = self.pending.lock();
        if !pending.contains(&key) {
            pending.push(key);
        }
    }

    /// Keys with a pending action, in registration order
    pub fn pending(&self) -> Vec<AddressKey> {
        self.pending.lock().clone()
    }

    /// Stop the instance for one key, if it is still registered.
    ///
    /// Missing entries (already stopped, or never started) are a silent
    /// no-op. Stop failures are logged and never propagate; shutdown is
    /// best-effort and runs outside any request/response flow.
    pub fn run_key(&self, key: &AddressKey) {
        if let Some(handle) = self.registry.remove(key) {
            debug!(%key, "stopping embedded database instance");
            if let Err(error) = handle.stop() {
                warn!(%key, %error, "embedded database instance failed to stop");
            }
        }
    }

    /// Run every pending action, in registration order.
    ///
    /// The pending list is drained before any stop runs, so the registry
    /// lock is never taken while the coordinator's own lock is held, and a
    /// second `run` finds nothing to do. Each key's shutdown is independent:
    /// one failed stop never aborts the rest.
    pub fn run(&self) {
        let keys: Vec<AddressKey> = std::mem::take(&mut *self.pending.lock());
        for key in &keys {
            self.run_key(key);
        }
    }
}

impl Drop for ShutdownCoordinator {
    fn drop(&mut self) {
        self.run();
    }
}

#[cfg(test)]
mod tests {
    use dbspawn_core::HostAddress;
    use dbspawn_testkit::{ListenerBoard, MockEngine};

    use super::*;

    fn provisioned(
        ports: &[u16],
    ) -> (MockEngine, Arc<InstanceRegistry>, ShutdownCoordinator) {
        let board = ListenerBoard::new();
        let engine = MockEngine::new(board);
        let registry = InstanceRegistry::shared();
        let shutdown = ShutdownCoordinator::new(Arc::clone(&registry));
        for &port in ports {
            registry
                .ensure_started(&engine, &HostAddress::new("localhost", port), &shutdown)
                .expect("provisioning should succeed");
        }
        (engine, registry, shutdown)
    }

    #[test]
    fn test_run_key_stops_exactly_once() {
        let (engine, registry, shutdown) = provisioned(&[3307]);
        let key = AddressKey::new("localhost", 3307);

        shutdown.run_key(&key);
        assert_eq!(engine.stop_count(), 1);
        assert!(registry.is_empty());

        // Double trigger: entry already removed, silent no-op.
        shutdown.run_key(&key);
        assert_eq!(engine.stop_count(), 1);
    }

    #[test]
    fn test_run_key_for_unknown_key_is_noop() {
        let (engine, _registry, shutdown) = provisioned(&[]);
        shutdown.run_key(&AddressKey::new("localhost", 9999));
        assert_eq!(engine.stop_count(), 0);
    }

    #[test]
    fn test_run_drains_in_registration_order() {
        let (engine, registry, shutdown) = provisioned(&[3307, 3308]);
        assert_eq!(
            shutdown.pending(),
            vec![
                AddressKey::new("localhost", 3307),
                AddressKey::new("localhost", 3308),
            ]
        );

        shutdown.run();
        assert_eq!(engine.stop_count(), 2);
        assert!(registry.is_empty());
        assert!(shutdown.pending().is_empty());

        shutdown.run();
        assert_eq!(engine.stop_count(), 2);
    }

    #[test]
    fn test_one_failed_stop_does_not_abort_the_rest() {
        let (engine, registry, shutdown) = provisioned(&[3307, 3308]);
        engine.fail_stop_port(3307);

        shutdown.run();
        // The failing stop is logged and swallowed; 3308 still stops.
        assert!(registry.is_empty());
        assert_eq!(engine.stop_count(), 2);
        assert!(engine.board().is_listening(&AddressKey::new("localhost", 3307)));
        assert!(!engine.board().is_listening(&AddressKey::new("localhost", 3308)));
    }

    #[test]
    fn test_register_deduplicates_keys() {
        let (_engine, _registry, shutdown) = provisioned(&[]);
        let key = AddressKey::new("localhost", 3307);
        shutdown.register(key.clone());
        shutdown.register(key.clone());
        assert_eq!(shutdown.pending(), vec![key]);
    }

    #[test]
    fn test_drop_runs_pending_actions() {
        let (engine, registry, shutdown) = provisioned(&[3307]);
        drop(shutdown);
        assert_eq!(engine.stop_count(), 1);
        assert!(registry.is_empty());
    }
}
