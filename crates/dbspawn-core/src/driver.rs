//! Driver-side capability traits.
//!
//! `Driver` is the interface the facade itself presents (and registers with
//! the driver manager); `DelegateDriver` is the fully featured wrapped
//! driver, which additionally exposes its URL parser so the facade can
//! resolve the target addresses of a connection string without understanding
//! the grammar itself.
//!
//! All traits are object-safe and synchronous: callers are blocking threads,
//! and any timeout behavior belongs to the underlying driver or engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::HostAddress;
use crate::error::DriverError;

/// Connection properties passed alongside a URL (credentials, options).
pub type ConnectionProps = BTreeMap<String, String>;

/// A live database connection.
///
/// The data plane is owned entirely by the delegate; this surface is the
/// minimum needed to hand a usable connection back to a caller.
pub trait Connection: std::fmt::Debug + Send {
    /// Execute a statement, returning the affected-row count
    fn execute(&mut self, sql: &str) -> Result<u64, DriverError>;

    /// Whether the connection is still open and usable
    fn is_valid(&mut self) -> bool;

    /// Close the connection; closing twice is not an error
    fn close(&mut self) -> Result<(), DriverError>;
}

/// Description of one connection property a driver understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverPropertyInfo {
    /// Property name
    pub name: String,
    /// Current value, if one is set or defaulted
    pub value: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Whether a value must be supplied to connect
    pub required: bool,
    /// Allowed values, when the property is an enumeration
    pub choices: Vec<String>,
}

/// Driver version as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

/// The driver interface: what a driver manager calls.
pub trait Driver: Send + Sync {
    /// Open a connection for the given URL and properties
    fn connect(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Box<dyn Connection>, DriverError>;

    /// Whether this driver understands the URL's grammar
    fn accepts_url(&self, url: &str) -> Result<bool, DriverError>;

    /// The properties this driver would consult for the given URL
    fn property_info(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Vec<DriverPropertyInfo>, DriverError>;

    /// Driver version
    fn version(&self) -> DriverVersion;

    /// Whether the driver implements the full protocol specification
    fn compliant(&self) -> bool;

    /// Tracing target of the driver's logger, for drivers that offer one
    fn parent_logger(&self) -> Result<String, DriverError>;
}

/// The wrapped, fully featured driver the facade delegates to.
///
/// Beyond the plain [`Driver`] surface it exposes its URL parser, yielding
/// the ordered host/port entries a connection string addresses. The list may
/// be empty when the URL is not host/port-addressed (e.g. socket paths).
pub trait DelegateDriver: Driver {
    /// Parse the URL + properties into its target address list
    fn parse_addresses(
        &self,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Vec<HostAddress>, DriverError>;
}
