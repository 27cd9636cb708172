//! Mock embedded engine.
//!
//! Instances register `localhost:<port>` on the shared [`ListenerBoard`]
//! when started and deregister on stop, so a [`crate::MockDelegate`] over
//! the same board observes them exactly like a real server coming up.
//! Start and stop failures are injectable per port, and both calls are
//! counted for exactly-once assertions.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use dbspawn_core::{AddressKey, EmbeddedEngine, EngineError, EngineInstance, LOCALHOST};

use crate::board::ListenerBoard;

#[derive(Debug, Default)]
struct EngineState {
    fail_start: Mutex<HashSet<u16>>,
    fail_stop: Mutex<HashSet<u16>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

/// Mock engine factory. Cloning shares counters, injections and the board.
#[derive(Debug, Clone)]
pub struct MockEngine {
    board: ListenerBoard,
    state: Arc<EngineState>,
}

impl MockEngine {
    /// Create an engine that registers its instances on the given board
    pub fn new(board: ListenerBoard) -> Self {
        Self {
            board,
            state: Arc::new(EngineState::default()),
        }
    }

    /// The board instances register themselves on
    pub fn board(&self) -> &ListenerBoard {
        &self.board
    }

    /// Make every start on the port fail with [`EngineError::PortInUse`]
    pub fn fail_port(&self, port: u16) {
        self.state.fail_start.lock().insert(port);
    }

    /// Make every stop of an instance on the port fail
    pub fn fail_stop_port(&self, port: u16) {
        self.state.fail_stop.lock().insert(port);
    }

    /// Number of start calls across all instances
    pub fn start_count(&self) -> usize {
        self.state.starts.load(Ordering::SeqCst)
    }

    /// Number of stop calls across all instances
    pub fn stop_count(&self) -> usize {
        self.state.stops.load(Ordering::SeqCst)
    }
}

impl EmbeddedEngine for MockEngine {
    fn create(&self, port: u16) -> Result<Box<dyn EngineInstance>, EngineError> {
        Ok(Box::new(MockInstance {
            port,
            board: self.board.clone(),
            state: Arc::clone(&self.state),
            running: false,
        }))
    }
}

/// One mock instance; binds `localhost:<port>` on the board while running.
#[derive(Debug)]
pub struct MockInstance {
    port: u16,
    board: ListenerBoard,
    state: Arc<EngineState>,
    running: bool,
}

impl EngineInstance for MockInstance {
    fn start(&mut self) -> Result<(), EngineError> {
        self.state.starts.fetch_add(1, Ordering::SeqCst);
        let key = AddressKey::new(LOCALHOST, self.port);
        // Injected failures and genuinely-contested ports both surface as a
        // bind failure, like a real engine losing the port race.
        if self.state.fail_start.lock().contains(&self.port) || self.board.is_listening(&key) {
            return Err(EngineError::PortInUse { port: self.port });
        }
        self.board.listen(LOCALHOST, self.port);
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.state.stops.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_stop.lock().contains(&self.port) {
            return Err(EngineError::Stop {
                message: format!("instance on port {} refused to exit", self.port),
            });
        }
        if self.running {
            self.board.unlisten(&AddressKey::new(LOCALHOST, self.port));
            self.running = false;
        }
        Ok(())
    }

    fn port(&self) -> u16 {
        self.port
    }
}
