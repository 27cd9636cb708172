//! Shared fake of the OS socket table.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use dbspawn_core::AddressKey;

/// The set of addresses with a live listener.
///
/// Shared between a [`crate::MockDelegate`] (which consults it on connect)
/// and a [`crate::MockEngine`] (whose instances register themselves here on
/// start and deregister on stop). Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct ListenerBoard {
    listeners: Arc<Mutex<HashSet<AddressKey>>>,
}

impl ListenerBoard {
    /// Create an empty board (no listeners anywhere)
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an address as having a live listener, as if an externally
    /// managed server were already running there
    pub fn listen(&self, host: &str, port: u16) {
        self.listeners.lock().insert(AddressKey::new(host, port));
    }

    /// Remove the listener for a key, if any
    pub fn unlisten(&self, key: &AddressKey) {
        self.listeners.lock().remove(key);
    }

    /// Whether something is listening at the key
    pub fn is_listening(&self, key: &AddressKey) -> bool {
        self.listeners.lock().contains(key)
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether nothing is listening anywhere
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}
