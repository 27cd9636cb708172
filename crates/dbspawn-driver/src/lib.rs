//! Driver facade that provisions embedded database instances on demand.
//!
//! The facade first attempts a normal delegated connect. When the delegate
//! reports that nothing is listening at the target address and that address
//! is local, the facade starts an embedded instance bound to the requested
//! port, registers it in an address-keyed registry, arranges its shutdown,
//! and retries the connect exactly once. Intended for integration tests that
//! want a plain connection string with no pre-running server; explicitly not
//! for production deployment.
//!
//! Lifecycle guarantees:
//! - at most one embedded instance per distinct `host:port`, under any
//!   number of concurrent callers;
//! - exactly one shutdown action per started instance, stop at most once;
//! - non-local targets never provision, so genuine remote-connection
//!   failures are never masked.

pub mod facade;
pub mod manager;
pub mod registry;
pub mod shutdown;

pub use facade::EmbeddedDriver;
pub use manager::{driver_manager, DriverManager};
pub use registry::{InstanceHandle, InstanceRegistry, Provisioned};
pub use shutdown::ShutdownCoordinator;
