//! Core contracts for the dbspawn driver facade.
//!
//! This crate defines the capability traits the facade is written against
//! (`Driver`, `DelegateDriver`, `EmbeddedEngine`), the data model shared
//! across the workspace (`HostAddress`, `AddressKey`, `ConnectionRequest`),
//! and the error taxonomy (`DriverError`, `EngineError`).
//!
//! Production code only lives here and in `dbspawn-driver`; mock
//! implementations of these traits belong in `dbspawn-testkit`.

pub mod address;
pub mod driver;
pub mod engine;
pub mod error;
pub mod request;

pub use address::{AddressKey, HostAddress, LOCALHOST};
pub use driver::{
    Connection, ConnectionProps, DelegateDriver, Driver, DriverPropertyInfo, DriverVersion,
};
pub use engine::{EmbeddedEngine, EngineInstance};
pub use error::{DriverError, EngineError};
pub use request::ConnectionRequest;
