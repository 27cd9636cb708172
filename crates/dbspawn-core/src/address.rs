//! Host/port addressing and the registry key derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The literal host name treated as "this machine".
///
/// Classification is a case-insensitive match against this literal only.
/// IP-literal loopback forms (`127.0.0.1`, `::1`) and alternate local host
/// names are deliberately out of scope: connects to them never provision an
/// embedded instance.
pub const LOCALHOST: &str = "localhost";

/// One host/port entry from the delegate driver's URL parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostAddress {
    /// Host name exactly as the delegate yielded it
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl HostAddress {
    /// Create an address entry
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Whether this host textually denotes the local machine.
    ///
    /// See [`LOCALHOST`] for the (intentionally narrow) rule.
    pub fn is_local(&self) -> bool {
        self.host.eq_ignore_ascii_case(LOCALHOST)
    }

    /// The canonical registry key for this address
    pub fn key(&self) -> AddressKey {
        AddressKey::new(&self.host, self.port)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Canonical `"<host>:<port>"` registry key.
///
/// Distinct (host, port) pairs map to distinct keys: the host is preserved
/// verbatim (including case, which must match however the delegate
/// normalizes host names) and the port is rendered in decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AddressKey(String);

impl AddressKey {
    /// Build the canonical key for a (host, port) pair
    pub fn new(host: &str, port: u16) -> Self {
        Self(format!("{host}:{port}"))
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&HostAddress> for AddressKey {
    fn from(address: &HostAddress) -> Self {
        address.key()
    }
}
