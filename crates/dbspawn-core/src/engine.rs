//! Embedded database engine contract.
//!
//! The engine is an external collaborator (a process launcher for an actual
//! database server); this crate only defines the lifecycle seam the
//! provisioning code drives. Engine failures are fatal at this layer: the
//! registry never retries a failed create or start.

use crate::error::EngineError;

/// Factory for embedded database instances.
pub trait EmbeddedEngine: Send + Sync {
    /// Create a not-yet-started instance configured to bind the given port
    fn create(&self, port: u16) -> Result<Box<dyn EngineInstance>, EngineError>;
}

/// One created embedded instance.
///
/// Instances are started at most once and stopped at most once; the
/// provisioning and shutdown code upholds that ordering.
pub trait EngineInstance: Send {
    /// Launch the engine and wait until it accepts connections
    fn start(&mut self) -> Result<(), EngineError>;

    /// Stop the engine and release its port
    fn stop(&mut self) -> Result<(), EngineError>;

    /// The port this instance binds
    fn port(&self) -> u16;
}
